use anyhow::{Context as _, Result};
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};
use std::{
    collections::{BTreeMap, HashMap},
    future::Future,
};
use vcasino_types::{
    casino::{GameHistoryRecord, GameSession, Leaderboard, Player, PlayerId},
    execution::{Key, Value},
};

/// Key-value store the ledger reads and writes.
pub trait State {
    fn get(&self, key: &Key) -> impl Future<Output = Result<Option<Value>>>;
    fn insert(&mut self, key: Key, value: Value) -> impl Future<Output = Result<()>>;
    fn delete(&mut self, key: &Key) -> impl Future<Output = Result<()>>;

    /// Apply a batch of changes. Backends that can write atomically should override this.
    fn apply(&mut self, changes: Vec<(Key, Status)>) -> impl Future<Output = Result<()>> {
        async {
            for (key, status) in changes {
                match status {
                    Status::Update(value) => self.insert(key, value).await?,
                    Status::Delete => self.delete(&key).await?,
                }
            }
            Ok(())
        }
    }
}

/// In-memory state.
#[derive(Default)]
pub struct Memory {
    state: HashMap<Key, Value>,
}

impl Memory {
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}

impl State for Memory {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(self.state.get(key).cloned())
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.state.insert(key, value);
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        self.state.remove(key);
        Ok(())
    }

    async fn apply(&mut self, changes: Vec<(Key, Status)>) -> Result<()> {
        for (key, status) in changes {
            match status {
                Status::Update(value) => {
                    self.state.insert(key, value);
                }
                Status::Delete => {
                    self.state.remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::large_enum_variant)]
pub enum Status {
    Update(Value),
    Delete,
}

impl Write for Status {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Status::Update(value) => {
                0u8.write(writer);
                value.write(writer);
            }
            Status::Delete => 1u8.write(writer),
        }
    }
}

impl Read for Status {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        match kind {
            0 => Ok(Status::Update(Value::read(reader)?)),
            1 => Ok(Status::Delete),
            _ => Err(Error::InvalidEnum(kind)),
        }
    }
}

impl EncodeSize for Status {
    fn encode_size(&self) -> usize {
        1 + match self {
            Status::Update(value) => value.encode_size(),
            Status::Delete => 0,
        }
    }
}

/// Buffers writes over a read-only view of `S` so a whole settlement can be committed with one
/// [`State::apply`] call, or dropped without touching `S`.
pub struct Staged<'a, S: State> {
    state: &'a S,
    pending: BTreeMap<Key, Status>,
}

impl<'a, S: State> Staged<'a, S> {
    pub fn new(state: &'a S) -> Self {
        Self {
            state,
            pending: BTreeMap::new(),
        }
    }

    /// Changes in key order, ready for [`State::apply`].
    pub fn into_changes(self) -> Vec<(Key, Status)> {
        self.pending.into_iter().collect()
    }
}

impl<'a, S: State> State for Staged<'a, S> {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(match self.pending.get(key) {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key).await?,
        })
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.pending.insert(key, Status::Update(value));
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        self.pending.insert(key.clone(), Status::Delete);
        Ok(())
    }
}

pub(crate) async fn load_player<S: State>(state: &S, id: PlayerId) -> Result<Option<Player>> {
    match state.get(&Key::Player(id)).await.context("load player")? {
        Some(Value::Player(player)) => Ok(Some(player)),
        None => Ok(None),
        Some(other) => anyhow::bail!("unexpected value under player key: {other:?}"),
    }
}

pub(crate) async fn load_session<S: State>(state: &S, id: u64) -> Result<Option<GameSession>> {
    match state.get(&Key::Session(id)).await.context("load session")? {
        Some(Value::Session(session)) => Ok(Some(session)),
        None => Ok(None),
        Some(other) => anyhow::bail!("unexpected value under session key: {other:?}"),
    }
}

pub(crate) async fn load_history<S: State>(
    state: &S,
    player: PlayerId,
    seq: u64,
) -> Result<Option<GameHistoryRecord>> {
    match state
        .get(&Key::History(player, seq))
        .await
        .context("load history")?
    {
        Some(Value::History(record)) => Ok(Some(record)),
        None => Ok(None),
        Some(other) => anyhow::bail!("unexpected value under history key: {other:?}"),
    }
}

pub(crate) async fn load_leaderboard<S: State>(state: &S) -> Result<Leaderboard> {
    match state
        .get(&Key::Leaderboard)
        .await
        .context("load leaderboard")?
    {
        Some(Value::Leaderboard(leaderboard)) => Ok(leaderboard),
        None => Ok(Leaderboard::default()),
        Some(other) => anyhow::bail!("unexpected value under leaderboard key: {other:?}"),
    }
}

/// Next value a counter will hand out.
pub(crate) async fn load_counter<S: State>(state: &S, key: &Key) -> Result<u64> {
    match state.get(key).await.context("load counter")? {
        Some(Value::Counter(value)) => Ok(value),
        None => Ok(1),
        Some(other) => anyhow::bail!("unexpected value under counter key: {other:?}"),
    }
}

/// Read a counter and stage its increment, returning the value handed out.
pub(crate) async fn next_counter<S: State>(state: &mut S, key: Key) -> Result<u64> {
    let current = load_counter(state, &key).await?;
    state
        .insert(key, Value::Counter(current.saturating_add(1)))
        .await?;
    Ok(current)
}

/// Raise a counter so the next value it hands out is at least `floor`. Counters never move back.
pub(crate) async fn raise_counter<S: State>(state: &mut S, key: Key, floor: u64) -> Result<()> {
    if floor > load_counter(state, &key).await? {
        state.insert(key, Value::Counter(floor)).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_codec::Encode;
    use vcasino_types::casino::PlayerKind;

    fn player(id: u64) -> Player {
        Player::new(PlayerId(id), format!("p{id}"), PlayerKind::Registered, 0)
    }

    #[tokio::test]
    async fn test_staged_reads_through_and_buffers() {
        let mut memory = Memory::default();
        memory
            .insert(Key::Player(PlayerId(1)), Value::Player(player(1)))
            .await
            .unwrap();

        let mut staged = Staged::new(&memory);
        assert!(load_player(&staged, PlayerId(1)).await.unwrap().is_some());
        staged
            .insert(Key::Player(PlayerId(2)), Value::Player(player(2)))
            .await
            .unwrap();
        staged.delete(&Key::Player(PlayerId(1))).await.unwrap();
        assert!(load_player(&staged, PlayerId(1)).await.unwrap().is_none());
        assert!(load_player(&staged, PlayerId(2)).await.unwrap().is_some());

        let changes = staged.into_changes();
        assert_eq!(changes.len(), 2);
        // Nothing reached the backing store yet.
        assert_eq!(memory.len(), 1);

        memory.apply(changes).await.unwrap();
        assert!(load_player(&memory, PlayerId(1)).await.unwrap().is_none());
        assert!(load_player(&memory, PlayerId(2)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_counter_starts_at_one() {
        let mut memory = Memory::default();
        assert_eq!(next_counter(&mut memory, Key::RoundCounter).await.unwrap(), 1);
        assert_eq!(next_counter(&mut memory, Key::RoundCounter).await.unwrap(), 2);
        assert_eq!(next_counter(&mut memory, Key::PlayerCounter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_raise_counter_never_lowers() {
        let mut memory = Memory::default();
        raise_counter(&mut memory, Key::RoundCounter, 10).await.unwrap();
        assert_eq!(load_counter(&memory, &Key::RoundCounter).await.unwrap(), 10);
        raise_counter(&mut memory, Key::RoundCounter, 4).await.unwrap();
        assert_eq!(next_counter(&mut memory, Key::RoundCounter).await.unwrap(), 10);
        assert_eq!(load_counter(&memory, &Key::RoundCounter).await.unwrap(), 11);
    }

    #[tokio::test]
    async fn test_wrong_value_type_is_an_error() {
        let mut memory = Memory::default();
        memory
            .insert(Key::Player(PlayerId(3)), Value::Counter(9))
            .await
            .unwrap();
        assert!(load_player(&memory, PlayerId(3)).await.is_err());
        assert!(load_leaderboard(&memory).await.unwrap().entries.is_empty());
    }

    #[test]
    fn test_status_codec() {
        let status = Status::Update(Value::Counter(7));
        let encoded = status.encode();
        assert_eq!(encoded.len(), status.encode_size());
        assert_eq!(Status::read(&mut &encoded[..]).unwrap(), status);
        let encoded = Status::Delete.encode();
        assert_eq!(Status::read(&mut &encoded[..]).unwrap(), Status::Delete);
    }
}

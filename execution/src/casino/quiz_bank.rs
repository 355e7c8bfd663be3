//! Embedded question bank for the quiz ladder, ten questions per difficulty level.

pub(crate) const DIFFICULTY_LEVELS: u8 = 10;

pub(crate) struct Question {
    pub difficulty: u8,
    pub prompt: &'static str,
    pub answers: [&'static str; 4],
    pub correct: u8,
}

const fn q(
    difficulty: u8,
    prompt: &'static str,
    answers: [&'static str; 4],
    correct: u8,
) -> Question {
    Question {
        difficulty,
        prompt,
        answers,
        correct,
    }
}

pub(crate) static QUESTIONS: &[Question] = &[
    q(1, "How many continents are there on Earth?", ["5", "6", "7", "8"], 2),
    q(1, "What colour is the sky on a clear day?", ["Red", "Green", "Blue", "Yellow"], 2),
    q(1, "How many legs does a spider have?", ["6", "8", "10", "12"], 1),
    q(1, "What is the capital of Austria?", ["Berlin", "Vienna", "Zurich", "Munich"], 1),
    q(1, "Which animal gives milk?", ["Dog", "Cat", "Cow", "Horse"], 2),
    q(1, "How many seasons are there?", ["2", "3", "4", "5"], 2),
    q(1, "Which planet is closest to Earth?", ["Mars", "Venus", "Jupiter", "Saturn"], 1),
    q(1, "How many days are in a week?", ["5", "6", "7", "8"], 2),
    q(1, "Which organ pumps blood through the body?", ["Brain", "Lungs", "Heart", "Stomach"], 2),
    q(1, "What is H2O?", ["Air", "Water", "Fire", "Earth"], 1),
    q(2, "In which year did the Berlin Wall fall?", ["1987", "1989", "1991", "1993"], 1),
    q(2, "Which is the largest mammal in the world?", ["Elephant", "Giraffe", "Blue whale", "Rhino"], 2),
    q(2, "How many teeth does an adult usually have?", ["28", "30", "32", "34"], 2),
    q(2, "Which element has the chemical symbol 'O'?", ["Osmium", "Oxygen", "Gold", "Silver"], 1),
    q(2, "Who painted the Mona Lisa?", ["Picasso", "Van Gogh", "Da Vinci", "Monet"], 2),
    q(2, "How many players does a football side have on the pitch?", ["9", "10", "11", "12"], 2),
    q(2, "Which is the longest river in the world?", ["Nile", "Amazon", "Danube", "Mississippi"], 0),
    q(2, "In which country is Mount Everest?", ["India", "China", "Nepal", "Pakistan"], 2),
    q(2, "How many bones does an adult human have?", ["186", "206", "226", "246"], 1),
    q(2, "Which is the smallest country in the world?", ["Monaco", "Vatican City", "San Marino", "Liechtenstein"], 1),
    q(3, "Who wrote 'Romeo and Juliet'?", ["Goethe", "Shakespeare", "Schiller", "Kafka"], 1),
    q(3, "How many strings does a standard guitar have?", ["4", "5", "6", "7"], 2),
    q(3, "Which programming language did Guido van Rossum create?", ["Java", "Python", "C++", "Ruby"], 1),
    q(3, "In which year did the Titanic sink?", ["1910", "1912", "1914", "1916"], 1),
    q(3, "What is the capital of Australia?", ["Sydney", "Melbourne", "Canberra", "Brisbane"], 2),
    q(3, "What is the hardest natural material?", ["Steel", "Diamond", "Granite", "Quartz"], 1),
    q(3, "How many federal states does Austria have?", ["7", "8", "9", "10"], 2),
    q(3, "Who developed the theory of relativity?", ["Newton", "Einstein", "Galileo", "Hawking"], 1),
    q(3, "Which gas do humans breathe in?", ["CO2", "O2", "N2", "H2"], 1),
    q(3, "In which century did Mozart live?", ["16th", "17th", "18th", "19th"], 2),
    q(4, "What is the largest ocean on Earth?", ["Atlantic", "Indian Ocean", "Pacific", "Arctic"], 2),
    q(4, "Which is the only mammal that can fly?", ["Squirrel", "Bat", "Bird", "Insect"], 1),
    q(4, "How many hearts does an octopus have?", ["1", "2", "3", "4"], 2),
    q(4, "Which planet is named after the Roman god of war?", ["Venus", "Mars", "Jupiter", "Saturn"], 1),
    q(4, "In which year did humans first land on the Moon?", ["1967", "1969", "1971", "1973"], 1),
    q(4, "What is the currency of Japan?", ["Yuan", "Won", "Yen", "Ringgit"], 2),
    q(4, "Which is the most venomous animal in the world?", ["Cobra", "Scorpion", "Box jellyfish", "Black widow"], 2),
    q(4, "How many time zones are there on Earth?", ["12", "18", "24", "36"], 2),
    q(4, "Who invented the telephone?", ["Edison", "Bell", "Tesla", "Marconi"], 1),
    q(4, "Which element has atomic number 79?", ["Silver", "Gold", "Platinum", "Copper"], 1),
    q(5, "What is the longest wall in the world?", ["Berlin Wall", "Hadrian's Wall", "Great Wall of China", "West Bank barrier"], 2),
    q(5, "Which vitamin does sunlight help produce?", ["Vitamin A", "Vitamin C", "Vitamin D", "Vitamin E"], 2),
    q(5, "In which country was chess invented?", ["China", "India", "Persia", "Egypt"], 1),
    q(5, "How many chambers does the human heart have?", ["2", "3", "4", "5"], 2),
    q(5, "Which artist cut off his own ear?", ["Picasso", "Van Gogh", "Dali", "Monet"], 1),
    q(5, "What is the highest mountain in Africa?", ["Mount Kenya", "Kilimanjaro", "Mount Meru", "Atlas"], 1),
    q(5, "Which language has the most native speakers?", ["English", "Spanish", "Mandarin", "Hindi"], 2),
    q(5, "In which year did the First World War begin?", ["1912", "1914", "1916", "1918"], 1),
    q(5, "How many moons does Jupiter have?", ["53", "67", "79", "95"], 3),
    q(5, "What is the largest organ of the human body?", ["Liver", "Heart", "Brain", "Skin"], 3),
    q(6, "Who was the first president of the USA?", ["Lincoln", "Jefferson", "Washington", "Adams"], 2),
    q(6, "Which chemical element has the symbol 'Fe'?", ["Fluorine", "Iron", "Fermium", "Francium"], 1),
    q(6, "In which year was the European Union founded?", ["1991", "1992", "1993", "1994"], 2),
    q(6, "What is the capital of Canada?", ["Toronto", "Montreal", "Vancouver", "Ottawa"], 3),
    q(6, "Which planet spins fastest on its axis?", ["Earth", "Mars", "Jupiter", "Saturn"], 2),
    q(6, "How many zeros does a million have?", ["5", "6", "7", "8"], 1),
    q(6, "Who wrote 'The Odyssey'?", ["Homer", "Aristotle", "Plato", "Socrates"], 0),
    q(6, "Which is the most densely populated country?", ["India", "China", "Monaco", "Singapore"], 2),
    q(6, "What is the fear of spiders called?", ["Claustrophobia", "Arachnophobia", "Agoraphobia", "Acrophobia"], 1),
    q(6, "In which year did the Second World War end?", ["1943", "1944", "1945", "1946"], 2),
    q(7, "What is the smallest bone in the human body?", ["Stapes", "Malleus", "Incus", "Fibula"], 0),
    q(7, "Which is the only country in all four hemispheres?", ["Brazil", "Kiribati", "Indonesia", "Kenya"], 1),
    q(7, "Who invented the World Wide Web?", ["Bill Gates", "Steve Jobs", "Tim Berners-Lee", "Mark Zuckerberg"], 2),
    q(7, "How many symphonies did Beethoven compose?", ["7", "9", "11", "13"], 1),
    q(7, "Which is the rarest blood type?", ["A+", "B-", "AB-", "O-"], 2),
    q(7, "In which year was Google founded?", ["1996", "1998", "2000", "2002"], 1),
    q(7, "What is the largest desert in the world?", ["Sahara", "Gobi", "Antarctica", "Arabian Desert"], 2),
    q(7, "Which radioactive element is used in nuclear power plants?", ["Uranium", "Plutonium", "Radium", "All of them"], 3),
    q(7, "Who painted 'The Starry Night'?", ["Monet", "Van Gogh", "Picasso", "Rembrandt"], 1),
    q(7, "What is the capital of Iceland?", ["Oslo", "Helsinki", "Reykjavik", "Copenhagen"], 2),
    q(8, "Which mammals lay eggs?", ["Echidna", "Platypus", "Marsupials", "A and B"], 3),
    q(8, "In which year was the Magna Carta sealed?", ["1215", "1315", "1415", "1515"], 0),
    q(8, "How many ribs does a human usually have?", ["22", "24", "26", "28"], 1),
    q(8, "Which scientist discovered radioactivity?", ["Curie", "Einstein", "Becquerel", "Roentgen"], 2),
    q(8, "What is the deepest point in the ocean?", ["Mariana Trench", "Tonga Trench", "Philippine Trench", "Puerto Rico Trench"], 0),
    q(8, "Which is the longest reigning royal house in the world?", ["Windsor", "Grimaldi", "Yamato", "Bourbon"], 2),
    q(8, "In which year was the atomic bomb first built?", ["1939", "1941", "1943", "1945"], 3),
    q(8, "Roughly how many languages are spoken in the world?", ["3000", "5000", "7000", "9000"], 2),
    q(8, "Which is the oldest volcano still active?", ["Etna", "Vesuvius", "Kilauea", "Krakatoa"], 0),
    q(8, "Who wrote '1984'?", ["Huxley", "Orwell", "Bradbury", "Kafka"], 1),
    q(9, "Which is the only country without a rectangular flag?", ["Vatican", "Nepal", "Switzerland", "Monaco"], 1),
    q(9, "How many standard amino acids are there?", ["18", "20", "22", "24"], 1),
    q(9, "In which year was the euro introduced?", ["1997", "1999", "2001", "2002"], 1),
    q(9, "Which element has the highest density?", ["Gold", "Platinum", "Osmium", "Iridium"], 2),
    q(9, "Who composed 'The Four Seasons'?", ["Bach", "Mozart", "Vivaldi", "Handel"], 2),
    q(9, "Which of these is the shortest unit of time?", ["Nanosecond", "Picosecond", "Femtosecond", "Attosecond"], 3),
    q(9, "What is the most distant object humans have sent from Earth?", ["Moon", "Mars", "Voyager 1", "ISS"], 2),
    q(9, "In which century did Leonardo da Vinci live?", ["14th", "15th", "16th", "17th"], 1),
    q(9, "How many elements are in the periodic table?", ["98", "108", "118", "128"], 2),
    q(9, "What is the oldest known writing system?", ["Hieroglyphs", "Cuneiform", "Chinese", "Sanskrit"], 1),
    q(10, "Which place has the longest name?", ["Llanfairpwllgwyngyllgogerychwyrndrobwllllantysiliogogogoch", "Taumatawhakatangihangakoauauotamateaturipukakapikimaungahoronukupokaiwhenuakitanatahu", "Chargoggagoggmanchauggagoggchaubunagungamaugg", "Tweebuffelsmeteenskootmorsdoodgeskietfontein"], 1),
    q(10, "Which country has a national anthem without official lyrics?", ["Vatican", "San Marino", "Cyprus", "None"], 2),
    q(10, "How far is a light year?", ["9.46 trillion km", "9.46 million km", "9.46 quintillion km", "946 million km"], 0),
    q(10, "Who was the first human in space?", ["Armstrong", "Gagarin", "Glenn", "Shepard"], 1),
    q(10, "Which is the oldest university still operating?", ["Oxford", "Cambridge", "Bologna", "Al-Qarawiyyin"], 3),
    q(10, "How many calories are in a gram of fat?", ["4", "7", "9", "11"], 2),
    q(10, "In which year was the first e-mail sent?", ["1969", "1971", "1973", "1975"], 1),
    q(10, "Which is the most expensive painting ever sold?", ["Mona Lisa", "Salvator Mundi", "The Scream", "The Card Players"], 1),
    q(10, "Which constant denotes the speed of light?", ["c", "e", "pi", "G"], 0),
    q(10, "Which large country uses a single time zone across its whole territory?", ["Russia", "China", "India", "USA"], 1),
];

/// Indices of every question at `difficulty`.
pub(crate) fn indices_for(difficulty: u8) -> impl Iterator<Item = usize> {
    QUESTIONS
        .iter()
        .enumerate()
        .filter(move |(_, q)| q.difficulty == difficulty)
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_questions_per_level() {
        assert!(QUESTIONS.len() <= 128, "used-set is a u128 bitmask");
        assert_eq!(QUESTIONS.len(), 100);
        for level in 1..=DIFFICULTY_LEVELS {
            assert_eq!(indices_for(level).count(), 10, "level {level}");
        }
        assert!(QUESTIONS.iter().all(|q| q.correct < 4));
    }
}

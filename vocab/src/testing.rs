use rand::{seq::SliceRandom, Rng};

const WORDS: &[&str] = &[
    "the", "The", "THE.", "cat", "cat,", "Cat.", "sat", "sat.", "dog", "ran", "en", "un", "lugar",
    "de", "la", "Mancha,", "cuyo", "nombre", ".", ",", "no", "quiero", "acordarme", "Él", "él.",
    "año", "Años,", "don't", "x-y",
];

pub fn random_lines(rng: &mut impl Rng, n: usize) -> Vec<String> {
    (0..n)
        .map(|_| {
            let len = rng.gen_range(0..12);
            let mut line = String::new();
            for _ in 0..len {
                // Squaring the index skews draws towards the head of the list.
                let i = rng.gen_range(0..WORDS.len());
                let i = i * i / WORDS.len();
                line.push_str(WORDS[i]);
                line.push_str(if rng.gen_bool(0.2) { "  \t" } else { " " });
            }
            line
        })
        .collect()
}

pub fn random_entries(rng: &mut impl Rng, n: usize) -> Vec<crate::CountEntry> {
    let mut entries: Vec<_> = (0..n)
        .map(|i| crate::CountEntry::new(format!("k{:03}", i), rng.gen_range(0..10)))
        .collect();
    entries.shuffle(rng);
    entries
}

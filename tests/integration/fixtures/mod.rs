// Shared test data for the lexicon-backed pipeline tests

/// Small sense-graph lexicon covering "garden flowers blooming"
pub const GARDEN_LEXICON: &str = r#"{
    "words": ["gar", "den", "low", "lower", "in", "loom"],
    "senses": {
        "garden": ["garden.n.01"],
        "plot": ["plot.n.02"],
        "flower": ["flower.n.01"],
        "flowers": ["flower.n.01"],
        "bloom": ["bloom.n.01"]
    },
    "hypernyms": {
        "garden.n.01": ["plot.n.02"]
    }
}"#;

/// Drawable words, file form
pub const GARDEN_VISUAL_WORDS: &str = "# drawable words\ngar\nden\nflower\nlow\nloom\nbloom\n";

pub const GARDEN_PHRASE: &str = "garden flowers blooming";

// Runs the built `rebus` binary against fixture files

use std::process::Command;

#[path = "integration/fixtures/mod.rs"]
mod fixtures;
use fixtures::*;

#[path = "integration/mod.rs"]
mod test_utils;
use test_utils::TestFixture;

use rebus::RebusPuzzle;

fn rebus_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rebus"))
}

#[test]
fn test_segment_prints_json_lines_in_input_order() {
    let fixture = TestFixture::new();
    let lexicon = fixture.create_file("lexicon.json", GARDEN_LEXICON);
    let visual = fixture.create_file("visual.txt", GARDEN_VISUAL_WORDS);
    let input = fixture.create_file("phrases.txt", "garden\n\n  plot  \n");

    let output = rebus_bin()
        .arg("segment")
        .arg(GARDEN_PHRASE)
        .arg("--input")
        .arg(&input)
        .arg("--lexicon")
        .arg(&lexicon)
        .arg("--visual-words")
        .arg(&visual)
        .output()
        .expect("Failed to run rebus");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let puzzles: Vec<RebusPuzzle> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is a puzzle"))
        .collect();

    let phrases: Vec<&str> = puzzles.iter().map(|p| p.phrase.as_str()).collect();
    assert_eq!(phrases, vec![GARDEN_PHRASE, "garden", "plot"]);
    assert_eq!(puzzles[0].substrings.len(), 4);
    assert_eq!(puzzles[1].substrings.len(), 2);
    assert!(puzzles[2].is_empty());
}

#[test]
fn test_config_file_supplies_oracles_and_min_length() {
    let fixture = TestFixture::new();
    let lexicon = fixture.create_file("lexicon.json", GARDEN_LEXICON);
    let visual = fixture.create_file("visual.txt", GARDEN_VISUAL_WORDS);
    let config = fixture.create_file(
        "rebus.json",
        &serde_json::json!({
            "min_length": 4,
            "lexicon": lexicon,
            "visual_words": visual,
        })
        .to_string(),
    );

    let output = rebus_bin()
        .args(["segment", GARDEN_PHRASE, "--config"])
        .arg(&config)
        .output()
        .expect("Failed to run rebus");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let puzzle: RebusPuzzle = serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).unwrap();
    let words: Vec<&str> = puzzle.substrings.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(words, vec!["bloom"]);
}

#[test]
fn test_segment_without_visual_oracle_fails() {
    let fixture = TestFixture::new();
    let lexicon = fixture.create_file("lexicon.json", GARDEN_LEXICON);

    let output = rebus_bin()
        .args(["segment", "garden", "--lexicon"])
        .arg(&lexicon)
        .output()
        .expect("Failed to run rebus");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No visual oracle configured"));
}

#[test]
fn test_phrases_command_builds_corpus() {
    let fixture = TestFixture::new();
    let lexicon = fixture.create_file(
        "lexicon.json",
        r#"{ "words": ["man", "riding", "horse", "cup", "on", "table"] }"#,
    );
    let relationships = fixture.create_file(
        "relationships.json",
        r#"[
            { "relationships": [
                { "subject": { "name": "man" }, "predicate": "riding", "object": { "name": "horse" } },
                { "subject": { "name": "cup" }, "predicate": "ON", "object": { "names": ["table"] } },
                { "subject": { "name": "dog" }, "predicate": "on", "object": { "name": "table" } }
            ]}
        ]"#,
    );

    let output = rebus_bin()
        .arg("phrases")
        .arg(&relationships)
        .arg("--lexicon")
        .arg(&lexicon)
        .output()
        .expect("Failed to run rebus");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "cup on table\nman riding horse\n"
    );
}

#[test]
fn test_phrases_command_missing_file() {
    let fixture = TestFixture::new();
    let lexicon = fixture.create_file("lexicon.json", "{}");

    let output = rebus_bin()
        .arg("phrases")
        .arg(fixture.root_path.join("nope.json"))
        .arg("--lexicon")
        .arg(&lexicon)
        .output()
        .expect("Failed to run rebus");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("File does not exist"));
}

#[test]
fn test_eval_reports_metrics_for_word_list() {
    let fixture = TestFixture::new();
    let visual = fixture.create_file("visual.txt", "apple\ntree\nlove\n");
    let cases = fixture.create_file(
        "cases.json",
        r#"[
            { "word": "apple", "expected": true },
            { "word": "tree", "expected": true },
            { "word": "cloud", "expected": true },
            { "word": "love", "expected": false },
            { "word": "because", "expected": false },
            { "word": "during", "expected": false }
        ]"#,
    );

    let output = rebus_bin()
        .arg("eval")
        .arg(&cases)
        .arg("--json")
        .arg("--visual-words")
        .arg(&visual)
        .output()
        .expect("Failed to run rebus");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["total"], 6);
    let accuracy = summary["accuracy"].as_f64().unwrap();
    assert!((accuracy - 400.0 / 6.0).abs() < 1e-6);
    let false_positive_rate = summary["false_positive_rate"].as_f64().unwrap();
    assert!((false_positive_rate - 100.0 / 3.0).abs() < 1e-6);
    assert_eq!(summary["report"]["mismatches"][0]["word"], "cloud");
    assert_eq!(summary["report"]["mismatches"][1]["word"], "love");
}

#[test]
fn test_eval_text_summary() {
    let fixture = TestFixture::new();
    let visual = fixture.create_file("visual.txt", "apple\n");
    let cases = fixture.create_file("cases.json", r#"[{ "word": "apple", "expected": true }]"#);

    let output = rebus_bin()
        .arg("eval")
        .arg(&cases)
        .arg("--visual-words")
        .arg(&visual)
        .output()
        .expect("Failed to run rebus");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Accuracy: 100.0% (1/1 correct)"));
    assert!(stdout.contains("False Positive Rate: 0.0% (0/0 cases)"));
}

#[test]
fn test_eval_missing_cases_file() {
    let fixture = TestFixture::new();
    let visual = fixture.create_file("visual.txt", "apple\n");

    let output = rebus_bin()
        .arg("eval")
        .arg(fixture.root_path.join("nope.json"))
        .arg("--visual-words")
        .arg(&visual)
        .output()
        .expect("Failed to run rebus");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("File does not exist"));
}

/*!
 * Tests for the resilient response decoder
 */

use serde_json::{json, Value};

use scriptcast::decoding::{decode, DecodeTier, ResponseDecoder};
use scriptcast::errors::DecodeError;

fn names(records: &[serde_json::Map<String, Value>]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r["characterName"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn test_decode_wellFormedJson_shouldMatchStandardParser() {
    let inputs = [
        json!({"cast": [{"characterName": "A", "age": 30}, {"characterName": "B", "notes": "x, y}"}]}),
        json!([{"characterName": "A"}]),
        json!({"characterName": "Solo", "archetype": "Loner"}),
        json!({"characters": [{"characterName": "C", "requirements": ["a", "b"]}]}),
    ];

    for input in inputs {
        let text = serde_json::to_string_pretty(&input).unwrap();
        let decoded = decode(&text).unwrap();
        assert_eq!(decoded.tier, DecodeTier::Direct);

        let expected: Vec<Value> = match &input {
            Value::Array(items) => items.clone(),
            Value::Object(map) => match map.get("cast").or_else(|| map.get("characters")) {
                Some(Value::Array(items)) => items.clone(),
                _ => vec![input.clone()],
            },
            _ => unreachable!(),
        };
        let actual: Vec<Value> = decoded.records.into_iter().map(Value::Object).collect();
        assert_eq!(actual, expected);
    }
}

#[test]
fn test_decode_truncatedAfterFirstRecord_shouldKeepOnlyFirst() {
    let decoded = decode(r#"{"cast":[{"characterName":"A"},{"characterName":"B""#).unwrap();
    assert_eq!(names(&decoded.records), vec!["A"]);
}

#[test]
fn test_decode_completeObjectsPlusTrailingFragment_shouldKeepAllComplete() {
    for n in 1..6 {
        let complete: Vec<String> = (0..n)
            .map(|i| format!(r#"{{"characterName": "C{}", "notes": "brace {{ inside"}}"#, i))
            .collect();
        let text = format!(
            r#"{{"cast": [{}, {{"characterName": "Last", "notes": "cut of"#,
            complete.join(", ")
        );

        let decoded = decode(&text).unwrap();
        assert!(decoded.records.len() >= n, "n={} got {}", n, decoded.records.len());
    }
}

#[test]
fn test_decode_codeFenceWithProse_shouldParseDirectly() {
    let raw = "Here are the profiles you asked for:\n```json\n{\"cast\": [{\"characterName\": \"A\",}]}\n```\nLet me know!";
    let decoded = decode(raw).unwrap();
    assert_eq!(decoded.tier, DecodeTier::Direct);
    assert_eq!(names(&decoded.records), vec!["A"]);
}

#[test]
fn test_decode_invalidMiddleObject_shouldSalvageTheRest() {
    let raw = r#"{"cast": [{"characterName": "A"}, {"characterName": oops}, {"characterName": "C"}]}"#;
    let decoded = decode(raw).unwrap();
    assert_eq!(decoded.tier, DecodeTier::Salvaged);
    assert_eq!(names(&decoded.records), vec!["A", "C"]);
}

#[test]
fn test_decode_nothingUsable_shouldFailAfterAllTiers() {
    for raw in ["", "no json here", "{\"cast\": []}", "[1, 2, 3]", "{\"other\": {\"x\": 1}}"] {
        match decode(raw) {
            Err(DecodeError::NoRecoverableRecords { tiers_attempted, .. }) => {
                assert_eq!(tiers_attempted, 3, "input {:?}", raw)
            }
            Ok(decoded) => panic!("input {:?} decoded {:?}", raw, decoded),
        }
    }
}

#[test]
fn test_decoder_customField_shouldRequireThatField() {
    let decoder = ResponseDecoder::new("name");
    let decoded = decoder.decode(r#"[{"name": "A"}]"#).unwrap();
    assert_eq!(decoded.records.len(), 1);

    assert!(decoder.decode(r#"[{"characterName": "A"}]"#).is_err());
}

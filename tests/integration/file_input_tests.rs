/*!
 * Integration tests for inputs read from disk.
 */

use std::fs;
use std::sync::Arc;

use scriptcast::app_config::Config;
use scriptcast::casting::{
    AuthoritativeCharacter, CastingService, IdentityResolver, MergeGuard, RawCharacterMention,
    RegistryBuilder, SceneBreakdown,
};
use scriptcast::decoding::ResponseDecoder;
use scriptcast::providers::mock::MockClient;
use scriptcast::screenplay::ScriptAssembler;

use crate::common::{self, SAMPLE_BREAKDOWN, SAMPLE_CHARACTERS, SAMPLE_SCRIPT};

#[test]
fn test_registry_fromFilesOnDisk_shouldMatchInMemoryBuild() {
    let temp_dir = common::create_temp_dir().unwrap();
    let script_path = common::create_test_file(temp_dir.path(), "pilot.txt", SAMPLE_SCRIPT).unwrap();
    let cast_path = common::create_test_file(temp_dir.path(), "cast.json", SAMPLE_CHARACTERS).unwrap();
    let breakdown_path =
        common::create_test_file(temp_dir.path(), "breakdown.json", SAMPLE_BREAKDOWN).unwrap();

    let script = fs::read_to_string(&script_path).unwrap();
    let authoritative: Vec<AuthoritativeCharacter> =
        serde_json::from_str(&fs::read_to_string(&cast_path).unwrap()).unwrap();
    let breakdown: Vec<SceneBreakdown> =
        serde_json::from_str(&fs::read_to_string(&breakdown_path).unwrap()).unwrap();

    let doc = ScriptAssembler::with_defaults().assemble(&script);
    let registry = RegistryBuilder::default().build(
        &authoritative,
        &RawCharacterMention::from_document(&doc),
        &breakdown,
    );

    assert_eq!(registry.len(), 3);
    assert_eq!(registry[0].name, "Molly Reyes");
}

#[test]
fn test_config_fromFile_shouldDriveParserAndResolver() {
    let temp_dir = common::create_temp_dir().unwrap();
    let config_path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "parser": { "page_element_threshold": 10 },
            "identity": { "guard_containment": true, "min_key_length": 6 },
            "casting": { "identifying_field": "name" }
        }"#,
    )
    .unwrap();

    let config = Config::from_file(&config_path).unwrap();
    config.validate().unwrap();

    let doc = ScriptAssembler::new(config.parser.clone()).assemble(SAMPLE_SCRIPT);
    assert!(doc.pages.len() > 1);
    assert!(doc.pages.iter().all(|p| p.len() <= 10));

    // "jason" is shorter than the guard's minimum, so it stays apart
    let resolver = IdentityResolver::new(MergeGuard::from_config(&config.identity));
    let identities = resolver.resolve(&RawCharacterMention::from_document(&doc));
    assert_eq!(identities.len(), 4);

    let decoder = ResponseDecoder::from_config(&config.casting);
    assert_eq!(decoder.identifying_field(), "name");
    assert!(decoder.decode(r#"{"cast": [{"name": "Molly"}]}"#).is_ok());
}

#[test]
fn test_authoritativeList_withLooseFields_shouldDeserialize() {
    let json = r#"[
        {"name": "Molly", "importance": "lead", "age": "mid-30s"},
        {"name": "Jason", "age": 41},
        {"name": "Waiter", "age": null, "description": "Tired"}
    ]"#;

    let list: Vec<AuthoritativeCharacter> = serde_json::from_str(json).unwrap();

    assert_eq!(list[0].role.as_deref(), Some("lead"));
    assert_eq!(list[0].age.as_deref(), Some("mid-30s"));
    assert_eq!(list[1].age.as_deref(), Some("41"));
    assert_eq!(list[1].role, None);
    assert_eq!(list[2].age, None);
    assert_eq!(list[2].description.as_deref(), Some("Tired"));
}

#[test]
fn test_cast_withConfigFromFile_shouldUseConfiguredBatching() {
    let temp_dir = common::create_temp_dir().unwrap();
    let config_path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{ "casting": { "batch_size": 1, "max_concurrent_requests": 2 } }"#,
    )
    .unwrap();
    let config = Config::from_file(&config_path).unwrap();

    let doc = ScriptAssembler::new(config.parser.clone()).assemble(SAMPLE_SCRIPT);
    let registry = RegistryBuilder::default().build(&[], &RawCharacterMention::from_document(&doc), &[]);

    let client = Arc::new(MockClient::working());
    let service = CastingService::new(client.clone(), config.casting.clone());

    let (profiles, report) = tokio_test::block_on(service.cast(&registry));

    assert_eq!(profiles.len(), 3);
    assert_eq!(report.batches_total(), 3);
    assert_eq!(client.request_count(), 3);
    assert!(client.requests().iter().all(|r| r.characters.len() == 1));
}

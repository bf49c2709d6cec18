/*!
 * Tests for name normalization, identity resolution and registry building
 */

use std::collections::BTreeSet;

use scriptcast::casting::{
    build, display, normalize, partition, resolve, AuthoritativeCharacter, IdentityResolver,
    Importance, MergeGuard, RawCharacterMention, RegistryBuilder, SceneBreakdown,
};
use scriptcast::screenplay::assemble;

use crate::common::{SAMPLE_BREAKDOWN, SAMPLE_CHARACTERS, SAMPLE_SCRIPT};

fn mentions(names: &[&str]) -> Vec<RawCharacterMention> {
    names
        .iter()
        .map(|name| RawCharacterMention::new(*name, Some(1), 1))
        .collect()
}

#[test]
fn test_normalize_shouldBeIdempotent() {
    let names = [
        "JASON (V.O.)",
        "Jason  Calacanis (CONT'D)",
        "OLD MAN (70s)",
        "DR. SMITH (O.S.) (CONT’D)",
        "  ",
        "MARY-ANNE (30'S)",
        "GUARD #2 (into radio)",
    ];

    for name in names {
        let once = normalize(name);
        assert_eq!(normalize(&once), once, "name {:?}", name);
    }
}

#[test]
fn test_normalize_shouldStripExtensionsAndAges() {
    assert_eq!(normalize("JASON (V.O.)"), "jason");
    assert_eq!(normalize("OLD  MAN (70s)"), "old man");
    assert_eq!(normalize("GUARD (into radio)"), "guard");
}

#[test]
fn test_display_shouldTitleCaseUppercaseNames() {
    assert_eq!(display("MARY-ANNE O'NEIL"), "Mary-Anne O'neil");
    assert_eq!(display("McAllister"), "McAllister");
}

#[test]
fn test_resolve_substringNames_shouldShareOneIdentity() {
    let identities = resolve(&mentions(&["JASON", "JASON CALACANIS"]));

    assert_eq!(identities.len(), 1);
    assert_eq!(identities[0].name, "Jason Calacanis");
    assert_eq!(
        identities[0].aliases,
        BTreeSet::from(["jason".to_string(), "jason calacanis".to_string()])
    );
    assert_eq!(identities[0].line_count, 2);
}

#[test]
fn test_resolve_anyOrder_shouldGiveSameIdentities() {
    let forward = resolve(&mentions(&["JASON", "JASON CALACANIS", "MOLLY"]));
    let backward = resolve(&mentions(&["MOLLY", "JASON CALACANIS", "JASON"]));

    let names = |ids: &[scriptcast::CharacterIdentity]| -> BTreeSet<String> {
        ids.iter().map(|i| i.name.clone()).collect()
    };
    assert_eq!(names(&forward), names(&backward));
}

#[test]
fn test_resolve_withGuard_shouldKeepPartialWordsApart() {
    let raw = mentions(&["AL", "ALAN"]);

    assert_eq!(resolve(&raw).len(), 1);
    assert_eq!(IdentityResolver::new(MergeGuard::strict(3)).resolve(&raw).len(), 2);
}

#[test]
fn test_resolve_sampleScript_shouldMergeVariantsAndRankByLines() {
    let doc = assemble(SAMPLE_SCRIPT);
    let identities = resolve(&RawCharacterMention::from_document(&doc));

    let summary: Vec<(&str, usize)> = identities
        .iter()
        .map(|i| (i.name.as_str(), i.line_count))
        .collect();
    assert_eq!(
        summary,
        vec![("Molly", 3), ("Jason Calacanis", 2), ("Waiter", 1)]
    );

    assert_eq!(identities[0].scenes, BTreeSet::from([1, 2]));
    assert_eq!(identities[0].importance, Importance::Lead);
    assert!(identities[1].answers_to("JASON (O.S.)"));
}

#[test]
fn test_build_sampleInputs_shouldFollowAuthoritativeList() {
    let doc = assemble(SAMPLE_SCRIPT);
    let extracted = RawCharacterMention::from_document(&doc);
    let authoritative: Vec<AuthoritativeCharacter> = serde_json::from_str(SAMPLE_CHARACTERS).unwrap();
    let breakdown: Vec<SceneBreakdown> = serde_json::from_str(SAMPLE_BREAKDOWN).unwrap();

    let registry = build(&authoritative, &extracted, &breakdown);

    let names: Vec<&str> = registry.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Molly Reyes", "Jason", "Waiter"]);

    let molly = &registry[0];
    assert_eq!(molly.importance, Importance::Lead);
    assert_eq!(molly.line_count, 5);
    assert_eq!(molly.age.as_deref(), Some("34"));
    assert_eq!(molly.description.as_deref(), Some("Runs the diner"));
    assert!(molly.aliases.contains("molly"));

    let jason = &registry[1];
    assert_eq!(jason.importance, Importance::Supporting);
    assert_eq!(jason.line_count, 2);
    assert!(jason.aliases.contains("jason calacanis"));

    let waiter = &registry[2];
    assert_eq!(waiter.importance, Importance::Background);
    assert_eq!(waiter.scenes, BTreeSet::from([2, 3]));

    // Breakdown-only characters never enter the registry
    assert!(registry.iter().all(|i| !i.answers_to("GHOST")));
}

#[test]
fn test_build_withoutAuthoritativeList_shouldUseResolvedMentions() {
    let breakdown: Vec<SceneBreakdown> = serde_json::from_str(SAMPLE_BREAKDOWN).unwrap();
    let registry = build(&[], &mentions(&["MOLLY", "JASON"]), &breakdown);

    assert_eq!(registry.len(), 2);
    assert!(registry.iter().all(|i| !i.answers_to("GHOST")));
}

#[test]
fn test_build_duplicateAuthoritativeNames_shouldKeepFirst() {
    let authoritative = vec![
        AuthoritativeCharacter::new("Molly", "lead"),
        AuthoritativeCharacter::new("MOLLY (V.O.)", "background"),
        AuthoritativeCharacter::new("   ", "lead"),
    ];

    let registry = RegistryBuilder::default().build(&authoritative, &[], &[]);

    assert_eq!(registry.len(), 1);
    assert_eq!(registry[0].importance, Importance::Lead);
}

#[test]
fn test_partition_registry_shouldKeepLeadsInFirstBatch() {
    let doc = assemble(SAMPLE_SCRIPT);
    let authoritative: Vec<AuthoritativeCharacter> = serde_json::from_str(SAMPLE_CHARACTERS).unwrap();
    let registry = build(&authoritative, &RawCharacterMention::from_document(&doc), &[]);

    let batches = partition(&registry, 2);

    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0][0].name, "Molly Reyes");
    assert_eq!(batches[1].len(), 1);
}

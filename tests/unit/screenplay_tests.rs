/*!
 * Tests for screenplay cleaning and document assembly
 */

use scriptcast::app_config::ParserConfig;
use scriptcast::screenplay::{assemble, clean, ElementKind, ScriptAssembler};

use crate::common::{generate_script, SAMPLE_SCRIPT};

fn count(kind: &ElementKind, text: &str) -> usize {
    assemble(text).elements().filter(|e| &e.kind == kind).count()
}

#[test]
fn test_assemble_sampleScript_shouldClassifyEveryLineKind() {
    let doc = assemble(SAMPLE_SCRIPT);

    assert_eq!(doc.metadata.page_count, 1);
    assert_eq!(doc.metadata.scene_count, 2);
    assert_eq!(doc.metadata.character_count, 5);
    assert_eq!(doc.metadata.estimated_runtime_minutes, 1);

    assert_eq!(count(&ElementKind::Transition, SAMPLE_SCRIPT), 2);
    assert_eq!(count(&ElementKind::Parenthetical, SAMPLE_SCRIPT), 1);
    assert_eq!(count(&ElementKind::Dialogue, SAMPLE_SCRIPT), 6);

    let cues: Vec<&str> = doc.elements().filter_map(|e| e.character_name()).collect();
    assert_eq!(
        cues,
        vec!["MOLLY", "JASON CALACANIS (O.S.)", "MOLLY", "JASON", "MOLLY (CONT'D)", "WAITER"]
    );
}

#[test]
fn test_assemble_sampleScript_shouldAttributeDialogueToCueScene() {
    let doc = assemble(SAMPLE_SCRIPT);

    let dialogue_scenes: Vec<Option<usize>> = doc
        .elements()
        .filter(|e| e.is_dialogue())
        .map(|e| e.scene)
        .collect();
    assert_eq!(
        dialogue_scenes,
        vec![Some(1), Some(1), Some(1), Some(2), Some(2), Some(2)]
    );

    // Nothing before the first heading belongs to a scene
    let first = doc.elements().next().unwrap();
    assert_eq!(first.kind, ElementKind::Transition);
    assert_eq!(first.scene, None);
}

#[test]
fn test_assemble_sceneIndex_shouldNeverDecrease() {
    let doc = assemble(&generate_script(12, 4));
    let scenes: Vec<usize> = doc.elements().filter_map(|e| e.scene).collect();

    assert!(scenes.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(doc.scenes().len(), 12);
    assert_eq!(doc.scenes().last().unwrap().index, 12);
}

#[test]
fn test_assemble_smallThreshold_shouldPaginateWithoutLosingElements() {
    let script = generate_script(5, 3);
    let unpaged = assemble(&script);

    let config = ParserConfig {
        page_element_threshold: 7,
        ..ParserConfig::default()
    };
    let paged = ScriptAssembler::new(config).assemble(&script);

    assert!(paged.pages.len() > 1);
    assert!(paged.pages.iter().all(|p| p.len() <= 7 && !p.is_empty()));
    assert_eq!(paged.element_count(), unpaged.element_count());

    let numbers: Vec<usize> = paged.pages.iter().map(|p| p.number).collect();
    let expected: Vec<usize> = (1..=paged.pages.len()).collect();
    assert_eq!(numbers, expected);

    let unpaged_contents: Vec<&str> = unpaged.elements().map(|e| e.content.as_str()).collect();
    let paged_contents: Vec<&str> = paged.elements().map(|e| e.content.as_str()).collect();
    assert_eq!(paged_contents, unpaged_contents);
}

#[test]
fn test_assemble_oddInputs_shouldAlwaysReturnAtLeastOnePage() {
    let inputs = [
        "",
        "\n\n\n",
        "(((",
        "MOLLY",
        "))) ]]] }}}",
        "ÉLODIE\nBonjour.",
        "INT.",
        "\r\n\r\n",
        "THE END",
    ];

    for input in inputs {
        let doc = assemble(input);
        assert!(!doc.pages.is_empty(), "input {:?}", input);
        assert_eq!(doc.metadata.page_count, doc.pages.len());
    }
}

#[test]
fn test_assemble_loneUppercaseLine_shouldNotBeCue() {
    let doc = assemble("MOLLY");
    assert_eq!(doc.elements().next().unwrap().kind, ElementKind::Action);

    let doc = assemble("THE END\nRoll credits.");
    assert_eq!(doc.elements().next().unwrap().kind, ElementKind::Action);
}

#[test]
fn test_assemble_markdownWrappedScript_shouldMatchPlainScript() {
    let wrapped = "**INT. DINER - NIGHT**\n\n> MOLLY\n> We're closed.\n\n\"CUT TO:\"";
    let plain = "INT. DINER - NIGHT\n\nMOLLY\nWe're closed.\n\nCUT TO:";

    let wrapped_kinds: Vec<ElementKind> = assemble(wrapped).elements().map(|e| e.kind.clone()).collect();
    let plain_kinds: Vec<ElementKind> = assemble(plain).elements().map(|e| e.kind.clone()).collect();

    assert_eq!(wrapped_kinds, plain_kinds);
}

#[test]
fn test_clean_shouldBeIdempotent() {
    let inputs = [
        SAMPLE_SCRIPT,
        "<b>**JASON**</b>\r\n> > Hello   \r\n",
        "\"FADE IN:\"\n__*nested*__",
        "plain text",
        "",
    ];

    for input in inputs {
        let once = clean(input);
        assert_eq!(clean(&once), once, "input {:?}", input);
    }
}

#[test]
fn test_document_serialize_shouldTagElementKinds() {
    let doc = assemble("INT. OFFICE - DAY\nJASON\nHello there.");
    let value = serde_json::to_value(&doc).unwrap();

    let elements = &value["pages"][0]["elements"];
    assert_eq!(elements[0]["kind"]["type"], "scene_heading");
    assert_eq!(elements[1]["kind"]["type"], "character_cue");
    assert_eq!(elements[1]["kind"]["name"], "JASON");
    assert_eq!(elements[2]["kind"]["type"], "dialogue");
}

//! Integration tests for the tokenizer and signature composition through
//! the public API.

use busarg_signature::{split_top_level, Grammar, Signature, SignatureError, Tag};

#[test]
fn test_representative_signatures_are_single_elements() {
    for text in ["ay", "ai", "aai", "a{si}", "(issi)", "v", "a{sv}", "a(ya{sv})"] {
        let sig = Signature::parse(text).unwrap();
        assert!(sig.is_single_element(), "{text}");
        assert_eq!(split_top_level(text).unwrap(), [text]);
    }
}

#[test]
fn test_deep_split_matches_elements() {
    let text = "aas(issi)a{is}(i)(i(suasi(issi)(a{sv})))";
    let sig = Signature::parse(text).unwrap();
    let split = split_top_level(text).unwrap();
    assert_eq!(split.len(), 5);
    assert_eq!(sig.element_count(), 5);
    for (element, signature) in split.iter().zip(sig.elements()) {
        assert_eq!(signature, *element);
    }
}

#[test]
fn test_malformed_inputs_are_errors_not_panics() {
    for text in ["(ai(ss)", "a{si", "(", "a", "a{", "{", ")", "}", "((i)", "a{}"] {
        assert!(split_top_level(text).is_err(), "{text}");
    }
}

#[test]
fn test_error_messages_name_the_problem() {
    let err = split_top_level("(ai(ss)").unwrap_err();
    assert_eq!(err, SignatureError::Unbalanced { open: '(', offset: 0 });
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_struct_members_recurse() {
    let sig = Signature::parse("(i(suasi(issi)(a{sv})))").unwrap();
    let members = sig.struct_members().unwrap();
    assert_eq!(members.len(), 2);
    let inner = members[1].struct_members().unwrap();
    assert_eq!(inner, ["s", "u", "as", "i", "(issi)", "(a{sv})"]);
    assert_eq!(inner[2].array_element().unwrap().first_tag(), Some(Tag::String));
}

#[test]
fn test_stored_grammar_accepts_entry_elements_only() {
    assert!(Grammar::STORED.parse("{sv}").is_ok());
    assert!(Grammar::STORED.parse("{vs}").is_err());
    assert!(Signature::parse("{sv}").is_err());
}

#[test]
fn test_concat_builds_compound() {
    let parts = [
        Signature::parse("s").unwrap(),
        Signature::parse("a{sv}").unwrap(),
    ];
    let sig = Signature::concat(&parts).unwrap();
    assert_eq!(sig, "sa{sv}");
    assert_eq!(sig.element_count(), 2);
}

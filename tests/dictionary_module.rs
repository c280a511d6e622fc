mod common;

use common::{conf, dictionary, zip_archive};
use sword::{load_module, load_reference_overlay, Driver, ModuleType, SearchMode, SwordError};

fn strongs() -> Vec<u8> {
    let (idx, dat) = dictionary(&[
        ("G0025", "agapao: to love"),
        ("G0026", "agape: love, goodwill"),
        ("H0430", "elohim: God, gods"),
    ]);
    let conf = conf("StrongsTest", &["Description=Strong's numbers", "Encoding=UTF-8"]);
    zip_archive(&[
        ("mods.d/strongstest.conf", &conf),
        ("modules/lexdict/rawld4/strongstest/strongstest.idx", &idx),
        ("modules/lexdict/rawld4/strongstest/strongstest.dat", &dat),
    ])
}

#[test]
fn test_headword_line_is_stripped() {
    let mut idx = 0u32.to_le_bytes().to_vec();
    idx.extend(11u32.to_le_bytes());
    let conf = conf("Hello", &["ModDrv=RawLD4"]);
    let module = load_module(
        &zip_archive(&[("hello.conf", &conf), ("hello.idx", &idx), ("hello.dat", b"hello\nworld")]),
        ModuleType::Dictionary,
    )
    .unwrap();

    let entries = module.positions.dict_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries["hello"].start, 6);
    assert_eq!(module.render_text("hello").unwrap()["hello"], "world");
}

#[test]
fn test_default_driver_and_lookup() {
    let module = load_module(&strongs(), ModuleType::Dictionary).unwrap();
    assert_eq!(module.driver, Driver::RawLD4);
    assert_eq!(module.info().description.as_deref(), Some("Strong's numbers"));

    let texts = module.render_texts(&["H0430", "G9999", "G0026"]).unwrap();
    let keys: Vec<&str> = texts.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["H0430", "G0026"]);
    assert_eq!(texts["G0026"], "agape: love, goodwill");
}

#[test]
fn test_search_modes() {
    let module = load_module(&strongs(), ModuleType::Dictionary).unwrap();

    let found = module.search_dictionary("g00", SearchMode::Prefix).unwrap();
    assert_eq!(found.keys().collect::<Vec<_>>(), vec!["G0025", "G0026"]);

    let found = module.search_dictionary("LOVE", SearchMode::Substring).unwrap();
    assert_eq!(found.keys().collect::<Vec<_>>(), vec!["G0025", "G0026"]);

    assert!(module.search_dictionary("love", SearchMode::Prefix).unwrap().is_empty());
}

#[test]
fn test_short_records() {
    let dat = b"G0025\ragapao".to_vec();
    let mut idx = 0u32.to_le_bytes().to_vec();
    idx.extend((dat.len() as u16).to_le_bytes());
    let conf = conf("Morph", &["ModDrv=RawLD"]);
    let module = load_module(
        &zip_archive(&[("morph.conf", &conf), ("morph.idx", &idx), ("morph.dat", &dat)]),
        ModuleType::Morphology,
    )
    .unwrap();
    assert_eq!(module.driver, Driver::RawLD);
    assert_eq!(module.render_text("G0025").unwrap()["G0025"], "agapao");
}

#[test]
fn test_missing_data_file() {
    let (idx, _) = dictionary(&[("G0025", "agapao")]);
    let conf = conf("NoData", &[]);
    let err = load_module(&zip_archive(&[("nodata.conf", &conf), ("nodata.idx", &idx)]), ModuleType::Dictionary)
        .unwrap_err();
    assert!(matches!(err, SwordError::IncompleteModule { .. }), "{:?}", err);
}

#[test]
fn test_bible_driver_for_dictionary_is_rejected() {
    let (idx, dat) = dictionary(&[("G0025", "agapao")]);
    let conf = conf("Mixed", &["ModDrv=zText"]);
    let err = load_module(
        &zip_archive(&[("mixed.conf", &conf), ("mixed.idx", &idx), ("mixed.dat", &dat)]),
        ModuleType::Dictionary,
    )
    .unwrap_err();
    assert!(matches!(err, SwordError::UnsupportedDriver { .. }), "{:?}", err);
}

#[test]
fn test_reference_overlay() {
    let module = load_module(&strongs(), ModuleType::Dictionary).unwrap();
    assert!(module.lemma_references("H0430").is_none());

    let json = br#"{
        "H0430": {
            "Enoch": {"1": {"1": 1}},
            "Exod": {"3": {"6": 2}},
            "Gen": {"1": {"1": 1, "2": 3}}
        }
    }"#;
    let overlay = zip_archive(&[("strongs.json", json), ("nested/ignored.json", b"[]")]);
    let with_refs = load_reference_overlay(&module, &overlay).unwrap();
    assert!(with_refs.info().has_references);
    assert!(!module.info().has_references);

    let books = with_refs.lemma_references("H0430").unwrap();
    let names: Vec<&str> = books.iter().map(|(book, _)| *book).collect();
    assert_eq!(names, vec!["Gen", "Exod", "Enoch"]);
    assert_eq!(books[0].1[&1u32][&2u32], 3);
    assert!(with_refs.lemma_references("G0025").is_none());

    // text lookups are unchanged
    assert_eq!(with_refs.render_text("H0430").unwrap()["H0430"], "elohim: God, gods");
}

#[test]
fn test_overlay_without_json() {
    let module = load_module(&strongs(), ModuleType::Dictionary).unwrap();
    let err = load_reference_overlay(&module, &zip_archive(&[("readme.txt", b"nothing")])).unwrap_err();
    assert!(matches!(err, SwordError::IncompleteModule { .. }), "{:?}", err);

    let err = load_reference_overlay(&module, &zip_archive(&[("refs.json", b"[1, 2]")])).unwrap_err();
    assert!(matches!(err, SwordError::ParserError { .. }), "{:?}", err);
}

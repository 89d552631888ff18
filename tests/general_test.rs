use miette::Report;
use sentence_core::parser::Parser;
use std::fs;

#[test]
fn test_all_template_files() {
    let templates_dir = "./tests/templates";
    let entries = fs::read_dir(templates_dir).expect("Failed to read templates directory");

    let mut parsed = 0;
    for entry in entries {
        let entry = entry.expect("Failed to read directory entry");
        let path = entry.path();

        if path.is_file() && path.extension().is_some_and(|ext| ext == "tpl") {
            println!("Parsing file: {:?}", path);
            let source = fs::read_to_string(&path)
                .unwrap_or_else(|_| panic!("Failed to read file: {:?}", path));

            let mut parser = Parser::new_with_name(&source, path.display().to_string());
            if let Err(err) = parser.parse_template() {
                panic!("Failed to parse {:?}. Error: {:#?}", path, Report::new(err));
            }
            parsed += 1;
        }
    }
    assert!(parsed >= 4, "expected the sample templates to be present");
}

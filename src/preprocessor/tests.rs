use super::*;

use std::fs;

fn preprocess_all(text: &str) -> Result<Vec<Token>, ConfigError> {
    let mut pre = Preprocessor::from_scanner(Scanner::from_str("test.cpp", text));
    let mut out = Vec::new();
    while let Some(token) = pre.next_token(true)? {
        out.push(token);
    }
    Ok(out)
}

fn preprocessed_text(text: &str) -> String {
    preprocess_all(text)
        .expect("preprocess failed")
        .iter()
        .map(|t| t.value.as_str())
        .collect()
}

#[test]
fn test_plain_tokens_pass_through() {
    assert_eq!(preprocessed_text("x = 1;"), "x=1;");
}

#[test]
fn test_define_without_params() {
    let text = "#define FOO 42\nx = FOO;";
    assert_eq!(preprocessed_text(text), "x=42;");
}

#[test]
fn test_define_with_params_keeps_body_spaces() {
    // Runs of spaces in a body collapse to a single space.
    let text = "#define ADD(a,b) a  +  b\nv = ADD(1,2);";
    assert_eq!(preprocessed_text(text), "v=1 + 2;");
}

#[test]
fn test_macro_invocation_in_argument() {
    let text = "#define MUL(a,b) a * b\n#define ADD(a,b) a + b\nv = ADD(MUL(2,3),4);";
    assert_eq!(preprocessed_text(text), "v=2 * 3 + 4;");
}

#[test]
fn test_nested_macro_in_body() {
    let text = "#define INNER 7\n#define OUTER INNER\nx = OUTER;";
    assert_eq!(preprocessed_text(text), "x=7;");
}

#[test]
fn test_line_continuation() {
    let text = "#define LONG 1 \\\n2\nx = LONG;";
    assert_eq!(preprocessed_text(text), "x=1 2;");
}

#[test]
fn test_arity_mismatch() {
    let text = "#define ADD(a,b) a + b\nv = ADD(1);";
    let err = preprocess_all(text).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MacroArity { expected: 2, got: 1, .. }
    ));
}

#[test]
fn test_parameterized_macro_without_parens() {
    let text = "#define ADD(a,b) a + b\nv = ADD;";
    let err = preprocess_all(text).unwrap_err();
    assert!(matches!(err, ConfigError::MacroArity { got: 0, .. }));
}

#[test]
fn test_token_pasting() {
    let text = "#define GLUE(a,b) a ## b\nv = GLUE(foo,bar);";
    let tokens = preprocess_all(text).unwrap();
    let pasted = tokens.iter().find(|t| t.value == "foobar").unwrap();
    assert_eq!(pasted.kind, TokenKind::Identifier);
}

#[test]
fn test_pasted_identifier_can_invoke_macro() {
    let text = "#define foobar 9\n#define GLUE(a,b) a ## b\nv = GLUE(foo,bar);";
    assert_eq!(preprocessed_text(text), "v=9;");
}

#[test]
fn test_stringize() {
    let text = "#define STR(x) #x\ns = STR(hello);";
    let tokens = preprocess_all(text).unwrap();
    let s = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
    assert_eq!(s.value, "\"hello\"");
}

#[test]
fn test_stringize_keeps_argument_spacing() {
    let text = "#define STR(x) #x\ns = STR(a b);";
    let tokens = preprocess_all(text).unwrap();
    let s = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
    assert_eq!(s.value, "\"a b\"");
}

#[test]
fn test_undef() {
    let text = "#define FOO 1\n#undef FOO\nx = FOO;";
    assert_eq!(preprocessed_text(text), "x=FOO;");
}

#[test]
fn test_undef_of_unknown_name_is_fine() {
    assert_eq!(preprocessed_text("#undef NEVER\nx = 1;"), "x=1;");
}

#[test]
fn test_ifdef_taken() {
    let text = "#define FOO\n#ifdef FOO\nx = 1;\n#endif\n";
    assert_eq!(preprocessed_text(text), "x=1;");
}

#[test]
fn test_ifdef_skipped() {
    let text = "#ifdef FOO\nx = 1;\n#endif\ny = 2;";
    assert_eq!(preprocessed_text(text), "y=2;");
}

#[test]
fn test_ifndef_and_else() {
    let text = "#ifdef FOO\nclass A{};\n#else\nclass B{};\n#endif\n";
    assert_eq!(preprocessed_text(text), "classB{};");

    let text = "#ifndef FOO\nclass A{};\n#else\nclass B{};\n#endif\n";
    assert_eq!(preprocessed_text(text), "classA{};");
}

#[test]
fn test_inactive_branch_does_not_define() {
    let text = "#ifdef FOO\n#define BAR 1\n#endif\nx = BAR;";
    assert_eq!(preprocessed_text(text), "x=BAR;");
}

#[test]
fn test_nested_conditionals() {
    let text = "#define A\n#ifdef A\n#ifdef B\nx = 1;\n#else\nx = 2;\n#endif\n#endif\n";
    assert_eq!(preprocessed_text(text), "x=2;");
}

#[test]
fn test_nested_conditional_in_inactive_branch() {
    let text = "#ifdef A\n#ifdef B\nx = 1;\n#endif\nx = 2;\n#endif\ny = 3;";
    assert_eq!(preprocessed_text(text), "y=3;");
}

#[test]
fn test_second_else_is_an_error() {
    let text = "#ifdef FOO\n#else\n#else\n#endif\n";
    let err = preprocess_all(text).unwrap_err();
    assert!(matches!(err, ConfigError::UnbalancedConditional { .. }));
}

#[test]
fn test_missing_endif() {
    let err = preprocess_all("#ifdef FOO\nx = 1;").unwrap_err();
    assert!(matches!(err, ConfigError::UnbalancedConditional { .. }));
}

#[test]
fn test_stray_endif() {
    let err = preprocess_all("#endif\n").unwrap_err();
    assert!(matches!(err, ConfigError::UnbalancedConditional { .. }));
}

#[test]
fn test_stray_else() {
    let err = preprocess_all("#else\n").unwrap_err();
    assert!(matches!(err, ConfigError::UnbalancedConditional { .. }));
}

#[test]
fn test_include_quoted_path() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("inc.hpp"), "y = 2;\n").unwrap();
    let main = dir.path().join("main.cpp");
    fs::write(&main, "#include \"inc.hpp\"\nx = 1;\n").unwrap();

    let mut pre = Preprocessor::from_unit(&main).unwrap();
    let mut text = String::new();
    while let Some(token) = pre.next_token(false).unwrap() {
        text.push_str(&token.value);
    }
    assert_eq!(text, "y=2;x=1;");
}

#[test]
fn test_include_arrow_path_with_subdirectory() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("inc.hpp"), "y = 2;\n").unwrap();
    let main = dir.path().join("main.cpp");
    fs::write(&main, "#include <sub\\inc.hpp>\n").unwrap();

    let mut pre = Preprocessor::from_unit(&main).unwrap();
    let mut text = String::new();
    while let Some(token) = pre.next_token(false).unwrap() {
        text.push_str(&token.value);
    }
    assert_eq!(text, "y=2;");
}

#[test]
fn test_include_rejects_dot_segment() {
    let dir = tempfile::tempdir().unwrap();
    let main = dir.path().join("main.cpp");
    fs::write(&main, "#include \".\\inc.hpp\"\n").unwrap();

    let mut pre = Preprocessor::from_unit(&main).unwrap();
    let err = pre.next_token(false).unwrap_err();
    assert!(matches!(err, ConfigError::IncludeResolution { .. }));
}

#[test]
fn test_include_rejects_parent_segment() {
    let dir = tempfile::tempdir().unwrap();
    let main = dir.path().join("main.cpp");
    fs::write(&main, "#include \"..\\inc.hpp\"\n").unwrap();

    let mut pre = Preprocessor::from_unit(&main).unwrap();
    let err = pre.next_token(false).unwrap_err();
    assert!(matches!(err, ConfigError::IncludeResolution { .. }));
}

#[test]
fn test_include_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let main = dir.path().join("main.cpp");
    fs::write(&main, "#include \"nope.hpp\"\n").unwrap();

    let mut pre = Preprocessor::from_unit(&main).unwrap();
    let err = pre.next_token(false).unwrap_err();
    assert!(matches!(err, ConfigError::IncludeResolution { .. }));
}

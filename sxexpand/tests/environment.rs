use std::fs;

use sxexpand::{Environment, Expander, Request, SecretProvider, sanitize};
use tempfile::TempDir;

fn expand(env: Environment, template: &str) -> String {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tpl/example.yaml");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, template).unwrap();

    let mut out = Vec::new();
    Expander::new(env, SecretProvider::None)
        .run(
            &Request {
                template: Some(path),
                ..Default::default()
            },
            &mut out,
        )
        .unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn function_env() {
    let env = Environment::from([("TESTUSER".to_string(), "Pipo".to_string())]);

    assert_eq!(expand(env, "\nUser is {{ env \"TESTUSER\" }}"), "\nUser is Pipo");
}

#[test]
fn sanitized_variables_are_masked() {
    let env = sanitize(
        Environment::from([
            ("DB_PASSWORD".to_string(), "hunter2".to_string()),
            ("AZURE_CLIENT_SECRET".to_string(), "xyz".to_string()),
        ]),
        "hunter2",
    );

    assert_eq!(
        expand(env, r#"{{ env "DB_PASSWORD" }} {{ env "AZURE_CLIENT_SECRET" }}"#),
        "******** ********"
    );
}

#[test]
fn expandenv_is_not_supported() {
    assert_eq!(
        expand(Environment::new(), r#"{{ expandenv "$HOME" }}"#),
        "<expandenv is not supported>"
    );
}

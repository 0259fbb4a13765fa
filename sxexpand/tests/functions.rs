use std::fs;

use sxconfig::parse_values;
use sxexpand::{Environment, Expander, SecretProvider};
use tempfile::TempDir;

fn render(text: &str, values: &str) -> String {
    let dir = TempDir::new().unwrap();
    Expander::new(Environment::new(), SecretProvider::None)
        .render("test", text, dir.path(), &parse_values(values).unwrap())
        .unwrap()
}

#[test]
fn values_to_yaml() {
    let out = render(
        "config:\n{{ toYaml .Values.db | indent 2 }}",
        "db:\n  host: localhost\n  port: 5432\n",
    );

    assert_eq!(out, "config:\n  host: localhost\n  port: 5432");
}

#[test]
fn values_to_json() {
    assert_eq!(render("{{ toJson .Values }}", "b: 1\na: [x]\n"), r#"{"a":["x"],"b":1}"#);
}

#[test]
fn path_functions() {
    assert_eq!(
        render(
            r#"{{ filebase "/etc/app/conf.yaml" }} {{ filedir "/etc/app/conf.yaml" }} {{ fileext "conf.yaml" }} {{ fileclean "a/../b/./c" }}"#,
            ""
        ),
        "conf.yaml /etc/app .yaml b/c"
    );
}

#[test]
fn default_in_pipeline() {
    assert_eq!(render(r#"{{ .Values.name | default "anon" }}"#, "name: \"\"\n"), "anon");
    assert_eq!(render(r#"{{ .Values.name | default "anon" | upper | quote }}"#, "name: pipo\n"), "\"PIPO\"");
}

#[test]
fn file_get_reads_next_to_template() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("cert.pem"), "-----BEGIN-----").unwrap();

    let out = Expander::new(Environment::new(), SecretProvider::None)
        .render("test", r#"{{ fileGet "cert.pem" | b64enc }}"#, dir.path(), &Default::default())
        .unwrap();

    assert_eq!(out, "LS0tLS1CRUdJTi0tLS0t");
}

#[test]
fn file_glob_feeds_config_and_secrets() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("conf")).unwrap();
    fs::write(dir.path().join("conf/a.yaml"), "x: 1\n").unwrap();
    fs::write(dir.path().join("conf/b.txt"), "pipo").unwrap();
    fs::write(dir.path().join("other.txt"), "ignored").unwrap();

    let expander = Expander::new(Environment::new(), SecretProvider::None);
    let render = |text: &str| {
        expander
            .render("test", text, dir.path(), &Default::default())
            .unwrap()
    };

    assert_eq!(
        render(r#"{{ toJson (fileGlob "conf/*") }}"#),
        r#"{"conf/a.yaml":"x: 1\n","conf/b.txt":"pipo"}"#
    );
    assert_eq!(render(r#"{{ fileGlob "conf/*.txt" | asSecrets }}"#), "b.txt: cGlwbw==");

    let config: std::collections::BTreeMap<String, String> =
        serde_yaml::from_str(&render(r#"{{ fileGlob "conf/*" | asConfig }}"#)).unwrap();
    assert_eq!(config["a.yaml"], "x: 1\n");
    assert_eq!(config["b.txt"], "pipo");
}

#[test]
fn values_to_toml() {
    assert_eq!(
        render("{{ toToml .Values }}", "name: x\nport: 1\n"),
        "name = \"x\"\nport = 1\n"
    );
}

use std::fs;
use std::path::PathBuf;

use sxexpand::{Environment, Expander, Request, SecretProvider};
use tempfile::TempDir;

struct Case {
    name: &'static str,
    files: &'static [(&'static str, &'static str)],
    template: Option<&'static str>,
    bundle: Option<&'static str>,
    set_file: Option<&'static str>,
    want: &'static str,
}

const CASES: &[Case] = &[
    Case {
        name: "single template with a values file",
        files: &[
            ("tpl/example.txt", "\nUser is {{ .Values.user }}"),
            ("values.yaml", "\nuser: pipo"),
        ],
        template: Some("tpl/example.txt"),
        bundle: None,
        set_file: Some("values.yaml"),
        want: "\nUser is pipo",
    },
    Case {
        name: "bundle without common values",
        files: &[
            ("tpl/example.txt", "\n{{ .Values.team.lead }} says hello {{ .Values.audience }}!"),
            (
                "all.yaml",
                "\ntemplates:\n- file: tpl/example.txt\n  values:\n    audience: all\n    team:\n      lead: pipo",
            ),
        ],
        template: None,
        bundle: Some("all.yaml"),
        set_file: None,
        want: "\npipo says hello all!",
    },
    Case {
        name: "template values override common values",
        files: &[
            ("tpl/example.txt", "\n{{ .Values.team.lead }} says hello {{ .Values.audience }}!"),
            (
                "all.yaml",
                "\ntemplates:\n- file: tpl/example.txt\n  values:\n    team:\n      lead: pipo\nvalues:\n  audience: all\n  team:\n    lead: klukkluk",
            ),
        ],
        template: None,
        bundle: Some("all.yaml"),
        set_file: None,
        want: "\npipo says hello all!",
    },
    Case {
        name: "set file overrides template values",
        files: &[
            ("tpl/example.txt", "\n{{ .Values.team.lead }} says hello {{ .Values.audience }}!"),
            (
                "all.yaml",
                "\ntemplates:\n- file: tpl/example.txt\n  values:\n    team:\n      lead: pipo\nvalues:\n  audience: all\n  team:\n    lead: klukkluk",
            ),
            ("values.yaml", "\nteam:\n  lead: mammaloe"),
        ],
        template: None,
        bundle: Some("all.yaml"),
        set_file: Some("values.yaml"),
        want: "\nmammaloe says hello all!",
    },
];

fn create(dir: &TempDir, path: &str, text: &str) -> PathBuf {
    let full = dir.path().join(path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&full, text).unwrap();
    full
}

#[test]
fn yaml_files() {
    for case in CASES {
        let dir = TempDir::new().unwrap();
        for (path, text) in case.files {
            create(&dir, path, text);
        }
        let request = Request {
            template: case.template.map(|p| dir.path().join(p)),
            bundle: case.bundle.map(|p| dir.path().join(p)),
            set_file: case.set_file.map(|p| dir.path().join(p)),
        };

        let mut out = Vec::new();
        Expander::new(Environment::new(), SecretProvider::None)
            .run(&request, &mut out)
            .unwrap_or_else(|e| panic!("{}: {e:#}", case.name));

        assert_eq!(String::from_utf8(out).unwrap(), case.want, "{}", case.name);
    }
}

#[test]
fn bundle_templates_are_concatenated_in_order() {
    let dir = TempDir::new().unwrap();
    create(&dir, "a.tpl", "A={{ .Values.n }}\n");
    create(&dir, "b.tpl", "B={{ .Values.n }}\n");
    let bundle = create(
        &dir,
        "all.yaml",
        "templates:\n- file: a.tpl\n  values:\n    n: 1\n- file: b.tpl\nvalues:\n  n: 2\n",
    );

    let mut out = Vec::new();
    Expander::new(Environment::new(), SecretProvider::None)
        .run(
            &Request {
                bundle: Some(bundle),
                ..Default::default()
            },
            &mut out,
        )
        .unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "A=1\nB=2\n");
}

#[test]
fn missing_template_is_reported() {
    let dir = TempDir::new().unwrap();
    let request = Request {
        template: Some(dir.path().join("nope.tpl")),
        ..Default::default()
    };

    let err = Expander::new(Environment::new(), SecretProvider::None)
        .run(&request, &mut Vec::new())
        .unwrap_err();

    let message = format!("{err:#}");
    assert!(message.starts_with("expanding: reading "), "{message}");
    assert!(message.contains("nope.tpl"), "{message}");
}

#[test]
fn failing_bundle_template_names_the_bundle() {
    let dir = TempDir::new().unwrap();
    create(&dir, "bad.tpl", "{{ if }}");
    let bundle = create(&dir, "all.yaml", "templates:\n- file: bad.tpl\n");

    let err = Expander::new(Environment::new(), SecretProvider::None)
        .run(
            &Request {
                bundle: Some(bundle),
                ..Default::default()
            },
            &mut Vec::new(),
        )
        .unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("all.yaml"), "{message}");
    assert!(message.contains("parsing of '"), "{message}");
}

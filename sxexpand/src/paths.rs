//! Lexical path helpers behind `filebase`, `filedir`, `fileclean` and `fileext`
//!
//! They work on the text of the path only and never touch the file system.

const SEPARATOR: char = '/';

/// Chemin le plus court équivalent, par simple traitement lexical
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with(SEPARATOR);
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split(SEPARATOR) {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Dernier élément du chemin, séparateurs finaux ignorés
pub fn base(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() {
        return "/".to_string();
    }
    match trimmed.rfind(SEPARATOR) {
        Some(i) => trimmed[i + 1..].to_string(),
        None => trimmed.to_string(),
    }
}

/// Tout sauf le dernier élément, nettoyé
pub fn dir(path: &str) -> String {
    let head = match path.rfind(SEPARATOR) {
        Some(i) => &path[..=i],
        None => "",
    };
    clean(head)
}

/// Extension du dernier élément, point compris
pub fn ext(path: &str) -> String {
    for (i, c) in path.char_indices().rev() {
        match c {
            SEPARATOR => break,
            '.' => return path[i..].to_string(),
            _ => {}
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_paths() {
        let cases = [
            ("", "."),
            ("abc", "abc"),
            ("abc/./def", "abc/def"),
            ("abc//def/", "abc/def"),
            ("abc/../def", "def"),
            ("../../abc", "../../abc"),
            ("abc/..", "."),
            ("/../abc", "/abc"),
            ("/", "/"),
        ];
        for (input, want) in cases {
            assert_eq!(clean(input), want, "clean({input:?})");
        }
    }

    #[test]
    fn base_paths() {
        assert_eq!(base(""), ".");
        assert_eq!(base("/"), "/");
        assert_eq!(base("a/b/c.txt"), "c.txt");
        assert_eq!(base("a/b/"), "b");
        assert_eq!(base("file"), "file");
    }

    #[test]
    fn dir_paths() {
        assert_eq!(dir(""), ".");
        assert_eq!(dir("file"), ".");
        assert_eq!(dir("a/b/c.txt"), "a/b");
        assert_eq!(dir("/a"), "/");
        assert_eq!(dir("a/b/"), "a/b");
    }

    #[test]
    fn ext_paths() {
        assert_eq!(ext("a/b/c.tar.gz"), ".gz");
        assert_eq!(ext("a.d/file"), "");
        assert_eq!(ext("noext"), "");
    }
}

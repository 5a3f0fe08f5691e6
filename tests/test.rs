use gitlet::config::Config;
use gitlet::diff::{self, FileStatus};
use gitlet::hash::{hash_bytes, hash_to_hex, hex_to_hash, is_hash, Hash};
use gitlet::index::{Index, Toc};
use gitlet::object::{blob_hash, Blob, Commit, EntryKind, Object, Tree, TreeEntry};
use gitlet::refs;
use gitlet::repository::Repository;

use std::collections::BTreeMap;

use smallvec::smallvec;
use tempfile::TempDir;

fn temp_repo() -> (TempDir, Repository) {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path(), false).unwrap();
    (dir, repo)
}

fn h(byte: u8) -> Hash {
    [byte; 20]
}

//
//
// Hashing
//
//

#[test]
fn test_hash_is_deterministic() {
    assert_eq!(hash_bytes(b"one"), hash_bytes(b"one"));
    assert_ne!(hash_bytes(b"one"), hash_bytes(b"two"));
}

#[test]
fn test_hex_roundtrip() {
    let hash = hash_bytes(b"content");
    let hex = hash_to_hex(&hash);
    assert_eq!(hex.len(), 40);
    assert!(is_hash(&hex));
    assert_eq!(hex_to_hash(&hex).unwrap(), hash);
}

#[test]
fn test_is_hash_rejects_ref_names() {
    assert!(!is_hash("master"));
    assert!(!is_hash("HEAD"));
    assert!(!is_hash("abc123")); // too short
    let not_hex = "z".repeat(40);
    assert!(!is_hash(&not_hex));
}

//
//
// Object store
//
//

#[test]
fn test_blob_roundtrip() {
    let (_dir, repo) = temp_repo();
    let hash = repo.write_blob(b"hello world").unwrap();
    assert!(repo.storage.exists(&hash));
    assert_eq!(repo.read_blob(&hash).unwrap(), b"hello world");
}

#[test]
fn test_blob_dedup() {
    let (_dir, repo) = temp_repo();
    let h1 = repo.write_blob(b"same content").unwrap();
    let h2 = repo.write_blob(b"same content").unwrap();
    assert_eq!(h1, h2);
    assert_eq!(repo.storage.object_count(), 1);
}

#[test]
fn test_empty_blob() {
    let (_dir, repo) = temp_repo();
    let hash = repo.write_blob(b"").unwrap();
    assert_eq!(repo.read_blob(&hash).unwrap(), b"");
}

#[test]
fn test_large_blob() {
    let (_dir, repo) = temp_repo();
    let data: Vec<u8> = (0..100_000).map(|i| (i % 256) as u8).collect();
    let hash = repo.write_blob(&data).unwrap();
    assert_eq!(repo.read_blob(&hash).unwrap(), data);
}

#[test]
fn test_object_roundtrip_byte_equivalent() {
    let objects = vec![
        Object::Blob(Blob { data: b"file contents".to_vec() }),
        Object::Tree(Tree {
            entries: vec![TreeEntry {
                kind: EntryKind::Blob,
                hash: h(0xab),
                name: "file.txt".into(),
            }],
        }),
        Object::Commit(Commit {
            tree: h(0x01),
            parents: smallvec![h(0x02), h(0x03)],
            timestamp: 1_234_567_890,
            author: "test author".into(),
            message: "initial commit".into(),
        }),
    ];

    for object in objects {
        let encoded = object.encode();
        let decoded = Object::decode(&encoded).unwrap();
        assert_eq!(decoded, object);
        // write(read(h)) == h
        assert_eq!(decoded.encode(), encoded);
        assert_eq!(decoded.hash(), hash_bytes(&encoded));
    }
}

#[test]
fn test_tree_encoding_is_order_independent() {
    let entry = |name: &str, byte| TreeEntry {
        kind: EntryKind::Blob,
        hash: h(byte),
        name: name.into(),
    };

    let a = Object::Tree(Tree {
        entries: vec![entry("b.txt", 2), entry("a.txt", 1), entry("c.txt", 3)],
    });
    let b = Object::Tree(Tree {
        entries: vec![entry("c.txt", 3), entry("a.txt", 1), entry("b.txt", 2)],
    });

    assert_eq!(a.hash(), b.hash());
}

#[test]
fn test_commit_roundtrip_preserves_fields() {
    let commit = Commit {
        tree: h(0x11),
        parents: smallvec![h(0x22)],
        timestamp: 1000,
        author: "author".into(),
        message: "second".into(),
    };

    let decoded = Object::decode(&Object::Commit(commit.clone()).encode())
        .unwrap()
        .try_into_commit()
        .unwrap();
    assert_eq!(decoded, commit);
    assert_eq!(decoded.parents.as_slice(), &[h(0x22)]);
}

#[test]
fn test_decode_rejects_garbage() {
    assert!(Object::decode(b"").is_err());
    assert!(Object::decode(b"XXXX\x01garbage").is_err());
    assert!(Object::decode(b"GLT1\x09").is_err());
}

//
//
// Index
//
//

#[test]
fn test_index_add_get_rm() {
    let mut index = Index::default();

    index.write_add("src/main.rs", h(0xab));
    assert_eq!(index.count(), 1);
    assert_eq!(index.get("src/main.rs", 0), Some(&h(0xab)));

    index.write_rm("src/main.rs").unwrap();
    assert_eq!(index.count(), 0);
    assert!(index.get("src/main.rs", 0).is_none());
}

#[test]
fn test_index_conflict_stages_exclude_stage_zero() {
    let mut index = Index::default();

    index.write_add("f.txt", h(1));
    index.write_conflict("f.txt", Some(h(1)), Some(h(2)), Some(h(3)));

    assert!(!index.has_entry("f.txt", 0));
    assert_eq!(index.get("f.txt", 1), Some(&h(1)));
    assert_eq!(index.get("f.txt", 2), Some(&h(2)));
    assert_eq!(index.get("f.txt", 3), Some(&h(3)));
    assert!(index.file_in_conflict("f.txt"));
    assert_eq!(index.conflicted_paths(), vec!["f.txt".to_owned()]);
}

#[test]
fn test_index_resolving_conflict_restores_stage_zero() {
    let mut index = Index::default();

    index.write_conflict("f.txt", None, Some(h(2)), Some(h(3)));
    index.write_add("f.txt", h(9));

    assert_eq!(index.get("f.txt", 0), Some(&h(9)));
    assert!(!index.file_in_conflict("f.txt"));
    // exactly one entry for the path
    assert_eq!(index.count(), 1);
}

#[test]
fn test_index_rm_refuses_conflicted_path() {
    let mut index = Index::default();
    index.write_conflict("f.txt", None, Some(h(2)), Some(h(3)));
    assert!(index.write_rm("f.txt").is_err());
}

#[test]
fn test_index_text_roundtrip() {
    let (_dir, repo) = temp_repo();

    let mut index = Index::default();
    index.write_add("a/1.txt", h(0x0a));
    index.write_add("b.txt", h(0x0b));
    index.write_conflict("c.txt", Some(h(1)), Some(h(2)), Some(h(3)));
    index.save(&repo).unwrap();

    let loaded = Index::load(&repo).unwrap();
    assert_eq!(loaded, index);
}

#[test]
fn test_index_matching_paths() {
    let mut index = Index::default();
    index.write_add("src/a.rs", h(1));
    index.write_add("src/sub/b.rs", h(2));
    index.write_add("readme.md", h(3));

    assert_eq!(index.matching_paths("src").len(), 2);
    assert_eq!(index.matching_paths("readme.md"), vec!["readme.md".to_owned()]);
    assert_eq!(index.matching_paths(".").len(), 3);
    assert!(index.matching_paths("srcx").is_empty());
}

#[test]
fn test_write_tree_nests_directories() {
    let (_dir, repo) = temp_repo();

    let blob = repo.write_blob(b"one").unwrap();
    let mut index = Index::default();
    index.write_add("a/b/c.txt", blob);
    index.write_add("a/d.txt", blob);
    index.write_add("e.txt", blob);

    let root_hash = index.write_tree(&repo).unwrap();
    let root = repo.read_object(&root_hash).unwrap().try_into_tree().unwrap();

    assert_eq!(root.count(), 2); // "a" and "e.txt"
    let a = root.find("a").unwrap();
    assert_eq!(a.kind, EntryKind::Tree);

    let a_tree = repo.read_object(&a.hash).unwrap().try_into_tree().unwrap();
    assert!(a_tree.find("b").is_some());
    assert!(a_tree.find("d.txt").is_some());
}

//
//
// Diff classification (the three-way merge table)
//
//

fn toc(entries: &[(&str, u8)]) -> Toc {
    entries.iter().map(|(p, b)| ((*p).to_owned(), h(*b))).collect()
}

fn classify(receiver: &[(&str, u8)], giver: &[(&str, u8)], base: &[(&str, u8)]) -> FileStatus {
    let deltas = diff::three_way(&toc(receiver), &toc(giver), &toc(base));
    deltas["f"].status
}

#[test]
fn test_three_way_table() {
    // base absent
    assert_eq!(classify(&[], &[("f", 1)], &[]), FileStatus::Add); // take giver
    assert_eq!(classify(&[("f", 1)], &[], &[]), FileStatus::Same); // keep receiver
    assert_eq!(classify(&[("f", 1)], &[("f", 1)], &[]), FileStatus::Same); // both added equal
    assert_eq!(classify(&[("f", 1)], &[("f", 2)], &[]), FileStatus::Conflict); // both added, differ

    // base present
    assert_eq!(classify(&[("f", 1)], &[("f", 2)], &[("f", 1)]), FileStatus::Modify); // giver changed
    assert_eq!(classify(&[("f", 2)], &[("f", 1)], &[("f", 1)]), FileStatus::Same); // receiver changed
    assert_eq!(classify(&[("f", 2)], &[("f", 2)], &[("f", 1)]), FileStatus::Same); // both changed, equal
    assert_eq!(classify(&[("f", 2)], &[("f", 3)], &[("f", 1)]), FileStatus::Conflict); // both changed, differ
    assert_eq!(classify(&[("f", 1)], &[("f", 1)], &[("f", 1)]), FileStatus::Same); // unchanged
    assert_eq!(classify(&[("f", 1)], &[], &[("f", 1)]), FileStatus::Delete); // giver deleted
    assert_eq!(classify(&[], &[("f", 1)], &[("f", 1)]), FileStatus::Same); // receiver deleted, giver unchanged
    assert_eq!(classify(&[], &[("f", 2)], &[("f", 1)]), FileStatus::Conflict); // deleted vs changed
    assert_eq!(classify(&[("f", 2)], &[], &[("f", 1)]), FileStatus::Conflict); // changed vs deleted
}

#[test]
fn test_name_status_two_way() {
    let a = toc(&[("keep", 1), ("gone", 2), ("edit", 3)]);
    let b = toc(&[("keep", 1), ("edit", 4), ("new", 5)]);

    let ns = diff::name_status(&a, &b);
    assert_eq!(ns["keep"], FileStatus::Same);
    assert_eq!(ns["gone"], FileStatus::Delete);
    assert_eq!(ns["edit"], FileStatus::Modify);
    assert_eq!(ns["new"], FileStatus::Add);
}

//
//
// Refs
//
//

#[test]
fn test_is_ref_families() {
    assert!(refs::is_ref("HEAD"));
    assert!(refs::is_ref("FETCH_HEAD"));
    assert!(refs::is_ref("MERGE_HEAD"));
    assert!(refs::is_ref("refs/heads/master"));
    assert!(refs::is_ref("refs/remotes/origin/master"));

    assert!(!refs::is_ref("refs/heads/"));
    assert!(!refs::is_ref("refs/heads/a/b"));
    assert!(!refs::is_ref("refs/remotes/origin"));
    assert!(!refs::is_ref("master"));
    assert!(!refs::is_ref("objects"));
}

#[test]
fn test_terminal_follows_symbolic_chain() {
    let (_dir, repo) = temp_repo();

    // Fresh repo: HEAD -> refs/heads/master, which does not exist yet but
    // is still the terminal direct ref.
    assert_eq!(refs::terminal(&repo, "HEAD").unwrap(), "refs/heads/master");
    assert_eq!(refs::hash_of(&repo, "HEAD").unwrap(), None);

    let hash = h(0x42);
    refs::write_hash(&repo, "refs/heads/master", &hash).unwrap();
    assert_eq!(refs::hash_of(&repo, "HEAD").unwrap(), Some(hash));

    // hash_of(terminal(ref)) == hash_of(ref)
    let terminal = refs::terminal(&repo, "HEAD").unwrap();
    assert_eq!(
        refs::hash_of(&repo, &terminal).unwrap(),
        refs::hash_of(&repo, "HEAD").unwrap()
    );
}

#[test]
fn test_hash_of_passes_hashes_through() {
    let (_dir, repo) = temp_repo();
    let hex = hash_to_hex(&h(0x17));
    assert_eq!(refs::hash_of(&repo, &hex).unwrap(), Some(h(0x17)));
}

#[test]
fn test_detached_head() {
    let (_dir, repo) = temp_repo();

    assert!(!refs::head_is_detached(&repo).unwrap());
    assert_eq!(refs::current_branch_name(&repo).unwrap().as_deref(), Some("master"));

    refs::detach_head(&repo, &h(0x42)).unwrap();
    assert!(refs::head_is_detached(&repo).unwrap());
    assert_eq!(refs::current_branch_name(&repo).unwrap(), None);
    assert_eq!(refs::terminal(&repo, "HEAD").unwrap(), "HEAD");
    assert_eq!(refs::hash_of(&repo, "HEAD").unwrap(), Some(h(0x42)));
}

#[test]
fn test_compose_and_parse_fetch_head() {
    let mut heads = BTreeMap::new();
    heads.insert("alt".to_owned(), h(1));
    heads.insert("master".to_owned(), h(2));

    let content = refs::compose_fetch_head(&heads, Some("master"), "/tmp/peer");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("not-for-merge branch 'alt' of /tmp/peer"));
    assert!(lines[1].starts_with(&hash_to_hex(&h(2))));
    assert!(!lines[1].contains("not-for-merge"));

    assert_eq!(refs::fetch_head_for_merge(&content).unwrap(), Some(h(2)));

    // No for-merge branch: every line is marked, nothing to merge.
    let content = refs::compose_fetch_head(&heads, None, "/tmp/peer");
    assert_eq!(refs::fetch_head_for_merge(&content).unwrap(), None);
}

//
//
// Config
//
//

#[test]
fn test_config_roundtrip() {
    let mut config = Config::new(false);
    config.set_remote("origin", "/tmp/peer");
    config.set_branch_remote("master", "origin");

    let parsed = Config::parse(&config.serialize()).unwrap();
    assert_eq!(parsed, config);
    assert!(!parsed.is_bare());
    assert_eq!(parsed.remote_url("origin"), Some("/tmp/peer"));
    assert_eq!(parsed.branch_remote("master"), Some("origin"));
    assert_eq!(parsed.remote_url("upstream"), None);
}

#[test]
fn test_config_bare_flag() {
    let config = Config::parse("[core]\n  bare = true\n").unwrap();
    assert!(config.is_bare());
}

#[test]
fn test_config_rejects_malformed_lines() {
    assert!(Config::parse("[remote origin]\n").is_err()); // missing quotes
    assert!(Config::parse("key = value\n").is_err()); // no section
    assert!(Config::parse("[core]\njust-a-word\n").is_err());
}

//
//
// Blob hashing shortcut used by add and the working TOC
//
//

#[test]
fn test_blob_hash_matches_stored_blob() {
    let (_dir, repo) = temp_repo();
    let stored = repo.write_blob(b"one").unwrap();
    assert_eq!(blob_hash(b"one"), stored);
}

//! Runs CLI commands against a hub backed by a mocked GitHub client.

use resux::cli::{execute, Commands};
use resux::inspect::inspect;
use resux::load_config::InspectSection;
use resux_core::github::{ContentKind, Github, MockGithubApi, RawContent, RawPage, RawUser};
use resux_core::offload::Offloader;
use resux_core::ProviderError;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

fn repo_json(full_name: &str, stars: u64) -> Value {
    let (owner, name) = full_name.split_once('/').expect("owner/name");
    json!({
        "name": name,
        "full_name": full_name,
        "description": format!("about {name}"),
        "stargazers_count": stars,
        "owner": { "login": owner }
    })
}

fn commit_json(sha: &str) -> Value {
    json!({
        "sha": sha,
        "commit": {
            "message": format!("commit {sha}"),
            "author": {
                "name": "Monalisa Octocat",
                "email": "support@github.com",
                "date": "2024-03-01T12:00:00Z"
            }
        }
    })
}

fn single_page(items: Vec<Value>) -> RawPage {
    RawPage {
        items,
        next_page: None,
        last_page: None,
    }
}

/// A mock describing one account `octocat` owning `hello` (with a readme) and
/// `spoon` (without one).
fn octocat_api() -> MockGithubApi {
    let mut api = MockGithubApi::new();
    api.expect_authenticated_user().returning(|| {
        Ok(RawUser {
            login: "octocat".to_string(),
            name: Some("The Octocat".to_string()),
            email: Some("octocat@github.com".to_string()),
        })
    });
    api.expect_repository().returning(|full_name| match full_name {
        "octocat/hello" => Ok(serde_json::from_value(repo_json(full_name, 80)).unwrap()),
        "octocat/spoon" => Ok(serde_json::from_value(repo_json(full_name, 12)).unwrap()),
        other => Err(ProviderError::NotFound {
            resource: format!("repos/{other}"),
        }),
    });
    api.expect_readme().returning(|full_name| match full_name {
        "octocat/hello" => Ok(RawContent {
            path: "README.md".to_string(),
            kind: ContentKind::File,
            content: b"# hello".to_vec(),
        }),
        other => Err(ProviderError::NotFound {
            resource: format!("repos/{other}/readme"),
        }),
    });
    api.expect_languages()
        .returning(|_| Ok(BTreeMap::from([("Rust".to_string(), 1024)])));
    api.expect_page().returning(|path, page, _| {
        let items = match (path, page) {
            ("user/repos", 1) => vec![repo_json("octocat/hello", 80), repo_json("octocat/spoon", 12)],
            ("repos/octocat/hello/commits", 1) => {
                vec![commit_json("c3"), commit_json("c2"), commit_json("c1")]
            }
            ("repos/octocat/hello/tags", 1) => vec![json!({ "name": "v1.0.0" })],
            _ => Vec::new(),
        };
        Ok(single_page(items))
    });
    api.expect_dir_contents().returning(|_, path| match path {
        "" => Ok(vec![
            RawContent {
                path: "src".to_string(),
                kind: ContentKind::Dir,
                content: Vec::new(),
            },
            RawContent {
                path: "README.md".to_string(),
                kind: ContentKind::File,
                content: b"# hello".to_vec(),
            },
        ]),
        "src" => Ok(vec![RawContent {
            path: "src/main.rs".to_string(),
            kind: ContentKind::File,
            content: b"fn main() {}".to_vec(),
        }]),
        _ => Ok(Vec::new()),
    });
    api
}

fn hub() -> Github {
    Github::new(Arc::new(octocat_api()), Offloader::new(4), 30)
}

#[tokio::test]
async fn whoami_reports_the_authenticated_user() {
    let value = execute(&hub(), &Commands::Whoami, &InspectSection::default())
        .await
        .expect("whoami");
    assert_eq!(
        value,
        json!({ "login": "octocat", "name": "The Octocat", "email": "octocat@github.com" })
    );
}

#[tokio::test]
async fn repos_lists_full_names_and_stars() {
    let value = execute(&hub(), &Commands::Repos, &InspectSection::default())
        .await
        .expect("repos");
    assert_eq!(value[0]["full_name"], "octocat/hello");
    assert_eq!(value[1]["stars"], 12);
}

#[tokio::test]
async fn files_lists_paths_depth_first() {
    let command = Commands::Files {
        repo: "hello".to_string(),
    };
    let value = execute(&hub(), &command, &InspectSection::default())
        .await
        .expect("files");
    assert_eq!(
        value,
        json!([
            { "path": "README.md", "size": 7 },
            { "path": "src/main.rs", "size": 12 }
        ])
    );
}

#[tokio::test]
async fn commits_honour_offset_and_limit() {
    let command = Commands::Commits {
        repo: "octocat/hello".to_string(),
        offset: 1,
        limit: 5,
    };
    let value = execute(&hub(), &command, &InspectSection::default())
        .await
        .expect("commits");
    let shas: Vec<&str> = value
        .as_array()
        .expect("array")
        .iter()
        .map(|c| c["sha"].as_str().expect("sha"))
        .collect();
    assert_eq!(shas, vec!["c2", "c1"]);
}

#[tokio::test]
async fn unknown_repository_is_an_error() {
    let command = Commands::Tags {
        repo: "octocat/nope".to_string(),
    };
    let err = execute(&hub(), &command, &InspectSection::default())
        .await
        .expect_err("missing repository");
    assert!(format!("{err:#}").contains("octocat/nope"));
}

#[tokio::test]
async fn inspect_keeps_the_requested_order() {
    let names = vec!["spoon".to_string(), "octocat/hello".to_string()];
    let settings = InspectSection {
        concurrency: 2,
        commits: 2,
    };

    let facts = inspect(&hub(), &names, &settings).await.expect("inspect");

    assert_eq!(facts.len(), 2);
    assert_eq!(facts[0].full_name, "octocat/spoon");
    assert!(!facts[0].has_readme);
    assert!(facts[0].recent_commits.is_empty());

    let hello = &facts[1];
    assert_eq!(hello.full_name, "octocat/hello");
    assert_eq!(hello.description.as_deref(), Some("about hello"));
    assert!(hello.has_readme);
    assert_eq!(hello.tags, vec!["v1.0.0"]);
    assert_eq!(hello.languages.get("Rust"), Some(&1024));
    let shas: Vec<&str> = hello.recent_commits.iter().map(|c| c.sha()).collect();
    assert_eq!(shas, vec!["c3", "c2"]);
}

//! Startup path: config -> tables on disk -> context -> scores.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use audience_diversity::testing::{scorer_with, MockTopicClassifier, MockUnshortener};
use audience_diversity::{Config, DiversityContext, DiversityError, Platform, Post};

fn write_file(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path.display().to_string()
}

fn config_for(domains: &str, topics: &str, extra: &[(&str, &str)]) -> Config {
    let mut pairs: Vec<(String, String)> = vec![
        ("AUDIENCE_DIVERSITY_FILE".into(), domains.into()),
        ("TOPIC_DIVERSITY_FILE".into(), topics.into()),
    ];
    pairs.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    Config::from_lookup(move |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    })
    .unwrap()
}

#[tokio::test]
async fn loaded_tables_drive_scoring() {
    let dir = tempfile::tempdir().unwrap();
    let domains = write_file(
        dir.path(),
        "audience_diversity.csv",
        "private_domain,n_visitors,visitor_var,partisanship\n\
         nytimes.com,5000,6.5,-0.3\n\
         smalltown.news,4,8.0,0.1\n",
    );
    let topics = write_file(dir.path(), "topic_diversity.json", r#"{"3": 1.2, "8": 4.0}"#);

    let context = DiversityContext::load(&config_for(&domains, &topics, &[])).unwrap();
    assert_eq!(context.domains.len(), 1);
    assert_eq!(context.topics.len(), 2);

    let scorer = scorer_with(
        context,
        Arc::new(MockUnshortener::new()),
        Arc::new(MockTopicClassifier::new()),
    );
    let posts = vec![
        Post::from_text("Story https://www.nytimes.com/a"),
        Post::from_text("Story https://smalltown.news/a"),
    ];

    let scores = scorer.score_batch(&posts, Platform::Other).await;

    assert_eq!(scores, vec![(6.5 - 4.86) / 1.64, 0.0]);
}

#[tokio::test]
async fn normalization_overrides_reach_the_scorer() {
    let dir = tempfile::tempdir().unwrap();
    let domains = write_file(dir.path(), "d.csv", "private_domain,n_visitors,visitor_var\ncnn.com,3,5.0\n");
    let topics = write_file(dir.path(), "t.json", "{}");

    let config = config_for(
        &domains,
        &topics,
        &[("AD_MEAN", "4.0"), ("AD_STD", "2.0"), ("MIN_DOMAIN_VISITORS", "1")],
    );
    let context = DiversityContext::load(&config).unwrap();
    let scorer = scorer_with(
        context,
        Arc::new(MockUnshortener::new()),
        Arc::new(MockTopicClassifier::new()),
    );

    let score = scorer
        .score_single(&Post::from_text("https://cnn.com/x"), Platform::Reddit)
        .await;

    assert_eq!(score, 0.5);
}

#[test]
fn missing_table_file_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    let topics = write_file(dir.path(), "t.json", "{}");
    let missing = dir.path().join("nope.csv").display().to_string();

    let err = DiversityContext::load(&config_for(&missing, &topics, &[])).unwrap_err();

    assert!(matches!(err, DiversityError::Io { .. }));
}

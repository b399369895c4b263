//! End to end tests of the ingest pipeline against a mocked Solr core.
//!
//! Sources and lexicons are written to a temporary directory, the pipeline is configured the same
//! way the binary configures it, and the requests received by the mock are inspected afterwards.

use std::path::PathBuf;

use clap::Parser as _;
use gazette::{config::IngestConfig, errors::PipelineError};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use temp_dir::TempDir;
use wiremock::{
    Mock, MockServer, Request, ResponseTemplate,
    matchers::{body_partial_json, method, path, query_param},
};

const ACK: &str = r#"{"responseHeader":{"status":0,"QTime":1}}"#;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.child(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn sources(dir: &TempDir) -> (PathBuf, PathBuf) {
    let train = write(
        dir,
        "train.tsv",
        "category\theadline\ttext\turl\n\
         politique\tVisite officielle\tAlassane Ouattara est arrivé à Dakar.\thttps://ex.sn/1\n\
         economie\tSommet\tLa CEDEAO se réunit à Abuja.\t\n",
    );
    let test = write(
        dir,
        "test.tsv",
        "category\theadline\ttext\n\
         sport\tFinale\tLes Lions de la Teranga gagnent à Yaoundé.\n",
    );
    (train, test)
}

async fn mount_solr(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/solr/press/update"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ACK))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/solr/press/update"))
        .and(query_param("commit", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ACK))
        .expect(1)
        .mount(server)
        .await;
}

fn config(server: &MockServer, sources: &[&PathBuf], extra: &[&str]) -> IngestConfig {
    let mut args = vec![
        "gazette".to_string(),
        "--index-url".to_string(),
        format!("{}/solr/press", server.uri()),
    ];
    for source in sources {
        args.push("--source".to_string());
        args.push(source.display().to_string());
    }
    args.extend(extra.iter().map(ToString::to_string));

    IngestConfig::try_parse_from(args).unwrap()
}

/// The documents posted to the update handler, in the order they were received.
fn posted_documents(requests: &[Request]) -> Vec<Value> {
    requests
        .iter()
        .filter(|request| request.method.as_str() == "POST")
        .map(|request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            body["add"]["doc"].clone()
        })
        .collect()
}

#[test_log::test(tokio::test)]
async fn test_ingest_with_enrichment() {
    let dir = TempDir::new().unwrap();
    let (train, test) = sources(&dir);
    let lexicon = write(
        &dir,
        "lexicon.tsv",
        "# surface\tlabel\n\
         Alassane Ouattara\tPER\n\
         Dakar\tLOC\n\
         Abuja\tLOC\n\
         Yaoundé\tLOC\n\
         CEDEAO\tORG\n\
         Lions de la Teranga\tMISC\n",
    );

    let server = MockServer::start().await;
    mount_solr(&server).await;

    let config = config(
        &server,
        &[&train, &test],
        &["--enrich", "--lexicon", &lexicon.display().to_string()],
    );
    let summary = config.pipeline().unwrap().run().await.unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.submitted, 3);
    assert!(summary.is_complete());
    assert!(summary.enriched);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests.last().unwrap().method.as_str(), "GET");

    let documents = posted_documents(&requests);
    assert_eq!(
        documents[0],
        json!({
            "id": 0,
            "category": "politique",
            "title": "Visite officielle",
            "content": "Alassane Ouattara est arrivé à Dakar.",
            "url": "https://ex.sn/1",
            "entity_location": ["Dakar"],
            "entity_person": ["Alassane Ouattara"],
            "entity_organization": [],
        })
    );
    assert_eq!(documents[1]["entity_organization"], json!(["CEDEAO"]));
    assert!(documents[1].get("url").is_none());
    assert_eq!(documents[2]["id"], json!(2));
    assert_eq!(documents[2]["entity_location"], json!(["Yaoundé"]));
    assert_eq!(documents[2]["entity_person"], json!([]));
}

#[test_log::test(tokio::test)]
async fn test_ingest_without_enrichment() {
    let dir = TempDir::new().unwrap();
    let (train, test) = sources(&dir);

    let server = MockServer::start().await;
    mount_solr(&server).await;

    let config = config(&server, &[&train, &test], &["--body-field", "description"]);
    let summary = config.pipeline().unwrap().run().await.unwrap();

    assert!(!summary.enriched);
    let documents = posted_documents(&server.received_requests().await.unwrap());
    let ids = documents
        .iter()
        .map(|document| document["id"].as_u64().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![0, 1, 2]);
    for document in &documents {
        let object = document.as_object().unwrap();
        assert!(object.keys().all(|key| !key.starts_with("entity_")));
        assert!(object.contains_key("description"));
        assert!(!object.contains_key("content"));
    }
}

#[test_log::test(tokio::test)]
async fn test_rejected_document_is_reported_and_run_commits() {
    let dir = TempDir::new().unwrap();
    let (train, _) = sources(&dir);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/solr/press/update"))
        .and(body_partial_json(json!({"add": {"doc": {"id": 1}}})))
        .respond_with(ResponseTemplate::new(400).set_body_string("document is missing field"))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_solr(&server).await;

    let summary = config(&server, &[&train], &[])
        .pipeline()
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.submitted, 1);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].id, 1);
    assert_eq!(summary.failed[0].status, Some(400));
}

#[test_log::test(tokio::test)]
async fn test_fail_fast_skips_commit() {
    let dir = TempDir::new().unwrap();
    let (train, _) = sources(&dir);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/solr/press/update"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = config(&server, &[&train], &["--fail-fast"])
        .pipeline()
        .unwrap()
        .run()
        .await;

    assert!(matches!(result, Err(PipelineError::Submit { id: 0, .. })));
}

#[test_log::test(tokio::test)]
async fn test_missing_source_submits_nothing() {
    let dir = TempDir::new().unwrap();
    let (train, _) = sources(&dir);
    let missing = dir.child("missing.tsv");

    let server = MockServer::start().await;

    let result = config(&server, &[&train, &missing], &[])
        .pipeline()
        .unwrap()
        .run()
        .await;

    assert!(matches!(result, Err(PipelineError::Source(_))));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_batched_ingest() {
    let dir = TempDir::new().unwrap();
    let (train, test) = sources(&dir);

    let server = MockServer::start().await;
    mount_solr(&server).await;

    let summary = config(&server, &[&train, &test], &["--batch-size", "2"])
        .pipeline()
        .unwrap()
        .run()
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let batches = requests
        .iter()
        .filter(|request| request.method.as_str() == "POST")
        .map(|request| serde_json::from_slice::<Value>(&request.body).unwrap())
        .collect::<Vec<_>>();

    assert_eq!(summary.submitted, 3);
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].as_array().unwrap().len(), 2);
    assert_eq!(batches[1][0]["id"], json!(2));
}

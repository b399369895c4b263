use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

use gazette_core::{CommitError, IndexWriter, SubmitError, indexing::Document};

use super::Solr;

/// `{"add": {"doc": ...}}`, the JSON update command for a single document
#[derive(Serialize)]
struct AddCommand<'a> {
    add: AddDocument<'a>,
}

#[derive(Serialize)]
struct AddDocument<'a> {
    doc: &'a Document,
}

impl Solr {
    async fn post_update(&self, body: Vec<u8>) -> Result<String, SubmitError> {
        let response = self
            .client
            .post(self.update_url())
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .body(body)
            .send()
            .await
            .map_err(|error| SubmitError::Transport(error.into()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| SubmitError::Transport(error.into()))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(SubmitError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl IndexWriter for Solr {
    async fn setup(&self) -> Result<()> {
        tracing::debug!(url = %self.update_url(), "Writing to Solr");
        Ok(())
    }

    /// Adds a single document with the JSON update handler.
    #[tracing::instrument(skip_all, fields(id = ?document.id()), err)]
    async fn submit(&self, document: &Document) -> Result<String, SubmitError> {
        let body = serde_json::to_vec(&AddCommand {
            add: AddDocument { doc: document },
        })?;

        self.post_update(body).await
    }

    /// Adds several documents at once by posting them as a JSON array.
    #[tracing::instrument(skip_all, fields(num_documents = documents.len()), err)]
    async fn submit_batch(&self, documents: &[Document]) -> Result<String, SubmitError> {
        let body = serde_json::to_vec(documents)?;

        self.post_update(body).await
    }

    #[tracing::instrument(skip_all, err)]
    async fn commit(&self) -> Result<String, CommitError> {
        let response = self
            .client
            .get(self.commit_url())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|error| CommitError::Transport(error.into()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| CommitError::Transport(error.into()))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(CommitError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn batch_size(&self) -> Option<usize> {
        self.batch_size
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path, query_param},
    };

    use super::*;

    const ACK: &str = r#"{"responseHeader":{"status":0,"QTime":3}}"#;

    fn solr(server: &MockServer) -> Solr {
        Solr::try_from_url(format!("{}/solr/press", server.uri()))
            .unwrap()
            .build()
            .unwrap()
    }

    fn document(id: u64) -> Document {
        Document::new()
            .with_field("id", id)
            .with_field("category", "sport")
            .with_field("title", "Finale")
            .with_field("content", "Les Lions l'emportent.")
    }

    #[test_log::test(tokio::test)]
    async fn test_submit_posts_add_command() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/solr/press/update"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "add": {"doc": {
                    "id": 7,
                    "category": "sport",
                    "title": "Finale",
                    "content": "Les Lions l'emportent."
                }}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(ACK))
            .expect(1)
            .mount(&server)
            .await;

        let ack = solr(&server).submit(&document(7)).await.unwrap();

        assert_eq!(ack, ACK);
    }

    #[test_log::test(tokio::test)]
    async fn test_submit_batch_posts_array() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/solr/press/update"))
            .and(body_json(json!([
                document(0).to_value(),
                document(1).to_value()
            ])))
            .respond_with(ResponseTemplate::new(200).set_body_string(ACK))
            .expect(1)
            .mount(&server)
            .await;

        let solr = Solr::try_from_url(format!("{}/solr/press", server.uri()))
            .unwrap()
            .batch_size(2)
            .build()
            .unwrap();

        assert_eq!(solr.batch_size(), Some(2));
        solr.submit_batch(&[document(0), document(1)])
            .await
            .unwrap();
    }

    #[test_log::test(tokio::test)]
    async fn test_rejected_document_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/solr/press/update"))
            .respond_with(ResponseTemplate::new(400).set_body_string("unknown field 'content'"))
            .mount(&server)
            .await;

        let result = solr(&server).submit(&document(0)).await;

        match result {
            Err(SubmitError::Status { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body, "unknown field 'content'");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_commit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/solr/press/update"))
            .and(query_param("commit", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ACK))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(solr(&server).commit().await.unwrap(), ACK);
    }

    #[test_log::test(tokio::test)]
    async fn test_commit_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/solr/press/update"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let error = solr(&server).commit().await.unwrap_err();

        assert!(matches!(error, CommitError::Status { status: 503, .. }));
        assert!(error.is_transient());
    }

    #[tokio::test]
    async fn test_unreachable_index_is_transport_error() {
        let solr = Solr::try_from_url("http://127.0.0.1:1/solr/press")
            .unwrap()
            .build()
            .unwrap();

        let error = solr.submit(&document(0)).await.unwrap_err();

        assert!(matches!(error, SubmitError::Transport(_)));
        assert!(error.is_transient());
    }
}

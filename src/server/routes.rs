use super::response::{self, Body};
use super::StatementServer;
use crate::db::StatementData;
use crate::model::{Account, Customer, Language};
use crate::statement::{Statement, StatementError};
use crate::validate::{validate_customer_id, validate_language};
use chrono::Local;
use hyper::http::request::Parts;
use hyper::{Method, Response, StatusCode};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{error, info, warn};

const LANGUAGES: &str = "/api/languages";
const CUSTOMER_PREFIX: &str = "/api/customer/";
const GENERATE_STATEMENT: &str = "/generate_statement";

const PDF_FAILED: &str = "Failed to generate PDF statement";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Route {
    Languages,
    Customer(i64),
    GenerateStatement,
}

impl Route {
    fn from_path(path: &str) -> Option<Route> {
        match path {
            LANGUAGES => Some(Route::Languages),
            GENERATE_STATEMENT => Some(Route::GenerateStatement),
            _ => {
                let id = path.strip_prefix(CUSTOMER_PREFIX)?;
                if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                id.parse().ok().map(Route::Customer)
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct LanguageInfo<'a> {
    code: Language,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct CustomerInfo {
    customer: Customer,
    /// The card number is masked.
    account: Option<Account>,
}

impl StatementServer {
    pub(super) async fn dispatch(&self, parts: &Parts) -> Response<Body> {
        let Some(route) = Route::from_path(parts.uri.path()) else {
            return response::error_json(StatusCode::NOT_FOUND, "Resource not found");
        };
        if parts.method != Method::GET {
            return response::method_not_allowed();
        }
        match route {
            Route::Languages => self.languages(),
            Route::Customer(customer_id) => self.customer(customer_id).await,
            Route::GenerateStatement => self.generate_statement(parts.uri.query()).await,
        }
    }

    fn languages(&self) -> Response<Body> {
        let languages: Vec<_> = self
            .translations
            .iter()
            .map(|(code, labels)| LanguageInfo {
                code,
                name: labels.statement_title,
            })
            .collect();
        response::json(StatusCode::OK, &languages)
    }

    async fn customer(&self, customer_id: i64) -> Response<Body> {
        let lookup = async {
            let Some(customer) = self.db.customer(customer_id).await? else {
                return Ok(None);
            };
            let account = self.db.account_for(customer_id).await?;
            crate::Result::Ok(Some(CustomerInfo {
                customer,
                account: account.map(|a| a.masked()),
            }))
        };
        match lookup.await {
            Ok(Some(info)) => response::json(StatusCode::OK, &info),
            Ok(None) => {
                warn!("No customer found with ID {customer_id}");
                response::error_json(StatusCode::NOT_FOUND, "Customer not found")
            }
            Err(e) => {
                error!("Error fetching customer {customer_id}: {e:#}");
                response::error_json(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }

    async fn generate_statement(&self, query: Option<&str>) -> Response<Body> {
        let params = query_params(query);
        let param = |name: &str| params.get(name).map(String::as_str);
        let customer_id = match validate_customer_id(param("customer_id")) {
            Ok(customer_id) => customer_id,
            Err(e) => {
                warn!("Rejected statement request: {e}");
                return response::text(StatusCode::BAD_REQUEST, e.message());
            }
        };
        let language = match validate_language(param("language")) {
            Ok(language) => language,
            Err(e) => {
                warn!("Rejected statement request: {e}");
                return response::text(StatusCode::BAD_REQUEST, e.message());
            }
        };
        info!("Generating a statement for customer {customer_id} in '{language}'");

        let data = match self.db.statement_data(customer_id, None).await {
            Ok(data) => data,
            Err(e) => {
                error!("Unable to load statement data for customer {customer_id}: {e:#}");
                return response::text(StatusCode::INTERNAL_SERVER_ERROR, PDF_FAILED);
            }
        };
        let (customer, account, transactions) = match data {
            StatementData::NoCustomer => {
                warn!("Customer not found for ID {customer_id}");
                return response::text(StatusCode::NOT_FOUND, "Customer not found");
            }
            StatementData::NoAccount(customer) => {
                warn!(
                    "No account found for customer ID {customer_id} ({})",
                    customer.full_name()
                );
                return response::text(
                    StatusCode::NOT_FOUND,
                    "No account found for this customer",
                );
            }
            StatementData::Found {
                customer,
                account,
                transactions,
            } => (customer, account, transactions),
        };

        let today = Local::now().date_naive();
        let statement = match Statement::new(customer, account, transactions, today) {
            Ok(statement) => statement,
            Err(StatementError::NoTransactions) => {
                warn!("No transactions found for customer ID {customer_id}");
                return response::text(
                    StatusCode::NOT_FOUND,
                    "No transactions found for this customer",
                );
            }
            Err(e) => {
                error!("Unable to build the statement for customer {customer_id}: {e}");
                return response::text(StatusCode::INTERNAL_SERVER_ERROR, PDF_FAILED);
            }
        };

        let labels = self.translations.get(language);
        match statement.to_pdf(labels, self.engine.as_ref()).await {
            Ok(pdf) => {
                info!("Generated {} byte statement for customer {customer_id}", pdf.len());
                response::pdf_attachment(pdf, &statement.download_name())
            }
            Err(e) => {
                error!("PDF generation error: {e:#}");
                response::text(StatusCode::INTERNAL_SERVER_ERROR, PDF_FAILED)
            }
        }
    }
}

/// Decodes a query string. When a name repeats, the first value wins.
fn query_params(query: Option<&str>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    if let Some(query) = query {
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params
                .entry(name.into_owned())
                .or_insert_with(|| value.into_owned());
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::{PdfEngine, StandInEngine};
    use crate::test::{TestEnv, NO_ACCOUNT_CUSTOMER_ID, NO_TRANSACTIONS_CUSTOMER_ID};
    use crate::Translations;
    use anyhow::bail;
    use http_body_util::BodyExt;
    use rust_decimal::Decimal;
    use hyper::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_TYPE};
    use hyper::Request;
    use std::sync::Arc;

    struct FailingEngine;

    #[async_trait::async_trait]
    impl PdfEngine for FailingEngine {
        async fn render(&self, _html: &str) -> crate::Result<Vec<u8>> {
            bail!("renderer crashed")
        }
    }

    fn server(env: &TestEnv, engine: Arc<dyn PdfEngine>) -> StatementServer {
        StatementServer::new(env.config().db().clone(), Translations::builtin(), engine)
    }

    async fn get(server: &StatementServer, uri: &str) -> (StatusCode, String, HeaderMap) {
        let request = Request::builder().uri(uri).body(()).unwrap();
        let (parts, body) = server.handle(request).await.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        (parts.status, text, parts.headers)
    }

    #[test]
    fn test_route_from_path() {
        assert_eq!(Route::from_path("/api/languages"), Some(Route::Languages));
        assert_eq!(
            Route::from_path("/generate_statement"),
            Some(Route::GenerateStatement)
        );
        assert_eq!(
            Route::from_path("/api/customer/42"),
            Some(Route::Customer(42))
        );
        assert_eq!(Route::from_path("/api/customer/"), None);
        assert_eq!(Route::from_path("/api/customer/-1"), None);
        assert_eq!(Route::from_path("/api/customer/abc"), None);
        assert_eq!(Route::from_path("/api/customer/99999999999999999999"), None);
        assert_eq!(Route::from_path("/"), None);
    }

    #[test]
    fn test_query_params() {
        let params = query_params(Some("customer_id=12&language=zh&language=ta&x=a%20b"));
        assert_eq!(params["customer_id"], "12");
        assert_eq!(params["language"], "zh");
        assert_eq!(params["x"], "a b");
        assert!(query_params(None).is_empty());
    }

    #[tokio::test]
    async fn test_languages() {
        let env = TestEnv::new().await;
        let server = server(&env, Arc::new(StandInEngine));
        let (status, body, _) = get(&server, "/api/languages").await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        let languages = value.as_array().unwrap();
        assert_eq!(languages.len(), 4);
        assert_eq!(languages[0]["code"], "en");
        assert_eq!(languages[0]["name"], "DBS Bank Credit Card Statement");
        assert_eq!(languages[3]["code"], "ta");
    }

    #[tokio::test]
    async fn test_customer() {
        let env = TestEnv::new().await;
        let server = server(&env, Arc::new(StandInEngine));
        let (status, body, _) = get(&server, "/api/customer/1").await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["customer"]["first_name"], "John");
        assert_eq!(value["account"]["card_number"], "XXXX-XXXX-XXXX-0366");
        assert!(!body.contains("4532015112830366"));

        let uri = format!("/api/customer/{NO_ACCOUNT_CUSTOMER_ID}");
        let (status, body, _) = get(&server, &uri).await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(value["account"].is_null());

        let (status, body, _) = get(&server, "/api/customer/404").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"error":"Customer not found"}"#);
    }

    #[tokio::test]
    async fn test_generate_statement() {
        let env = TestEnv::new().await;
        let server = server(&env, Arc::new(StandInEngine));
        let (status, body, headers) =
            get(&server, "/generate_statement?customer_id=1&language=ms").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[CONTENT_TYPE], "application/pdf");
        let expected = format!(
            "attachment; filename=\"DBS_Statement_John_Doe_{}.pdf\"",
            Local::now().date_naive().format("%Y%m%d")
        );
        assert_eq!(headers[CONTENT_DISPOSITION], expected.as_str());
        assert!(body.starts_with("%PDF"));
        assert!(body.contains("Penyata Kad Kredit Bank DBS"));
        assert!(body.contains("XXXX-0366"));
    }

    #[tokio::test]
    async fn test_generate_statement_defaults_to_english() {
        let env = TestEnv::new().await;
        let server = server(&env, Arc::new(StandInEngine));
        let (status, body, _) = get(&server, "/generate_statement?customer_id=%201%20").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("lang=\"en\""));
    }

    #[tokio::test]
    async fn test_generate_statement_bad_input() {
        let env = TestEnv::new().await;
        let server = server(&env, Arc::new(StandInEngine));
        let cases = [
            ("/generate_statement", "Customer ID is required"),
            (
                "/generate_statement?customer_id=abc",
                "Customer ID must be a valid integer",
            ),
            (
                "/generate_statement?customer_id=0",
                "Customer ID must be a positive integer",
            ),
            (
                "/generate_statement?customer_id=1&language=fr",
                "Unsupported language. Must be one of: en, zh, ms, ta",
            ),
        ];
        for (uri, message) in cases {
            let (status, body, _) = get(&server, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, message, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_generate_statement_not_found() {
        let env = TestEnv::new().await;
        let server = server(&env, Arc::new(StandInEngine));
        let cases = [
            (404, "Customer not found"),
            (NO_ACCOUNT_CUSTOMER_ID, "No account found for this customer"),
            (
                NO_TRANSACTIONS_CUSTOMER_ID,
                "No transactions found for this customer",
            ),
        ];
        for (customer_id, message) in cases {
            let uri = format!("/generate_statement?customer_id={customer_id}");
            let (status, body, _) = get(&server, &uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body, message, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_generate_statement_failures() {
        let env = TestEnv::new().await;
        let failing = server(&env, Arc::new(FailingEngine));
        let (status, body, _) = get(&failing, "/generate_statement?customer_id=1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, PDF_FAILED);

        env.insert_raw_transaction(NO_TRANSACTIONS_CUSTOMER_ID, "12,50").await;
        let server = server(&env, Arc::new(StandInEngine));
        let uri = format!("/generate_statement?customer_id={NO_TRANSACTIONS_CUSTOMER_ID}");
        let (status, body, _) = get(&server, &uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, PDF_FAILED);
    }

    #[tokio::test]
    async fn test_generate_statement_total_overflow() {
        let env = TestEnv::new().await;
        let max = Decimal::MAX.to_string();
        env.insert_raw_transaction(NO_TRANSACTIONS_CUSTOMER_ID, &max).await;
        env.insert_raw_transaction(NO_TRANSACTIONS_CUSTOMER_ID, &max).await;
        let server = server(&env, Arc::new(StandInEngine));
        let uri = format!("/generate_statement?customer_id={NO_TRANSACTIONS_CUSTOMER_ID}");
        let (status, body, _) = get(&server, &uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, PDF_FAILED);
    }

    #[tokio::test]
    async fn test_unknown_route_and_method() {
        let env = TestEnv::new().await;
        let server = server(&env, Arc::new(StandInEngine));
        let (status, body, _) = get(&server, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"error":"Resource not found"}"#);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/generate_statement")
            .body(())
            .unwrap();
        let response = server.handle(request).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}

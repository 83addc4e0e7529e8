//! Integration tests for cursor pagination

mod support;

use folio_client::{FolioError, Record};
use serde_json::json;
use support::{query_value, record_id, records, CursorListing, StubServer};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const ENDPOINT: &str = "/users";
const KEY: &str = "users";

fn listing(count: usize) -> StubServer {
    let stub = StubServer::with_auth();
    stub.mount(
        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .respond_with(CursorListing::new(KEY, records(count))),
    );
    stub
}

fn ids(records: &[Record]) -> Vec<String> {
    records.iter().map(|r| r["id"].as_str().unwrap_or_default().to_string()).collect()
}

#[test]
fn yields_every_record_once_in_order() {
    const PAGE: u32 = 5;
    for count in [0usize, 1, 5, 6, 15] {
        let stub = listing(count);
        let mut client = stub.connect();

        let collected = client.paginate(ENDPOINT, KEY, None, PAGE).unwrap().collect_all().unwrap();

        let expected: Vec<String> = (1..=count).map(record_id).collect();
        assert_eq!(ids(&collected), expected, "listing of {} records", count);

        // every non-empty page plus the empty one that ends the walk
        let page = PAGE as usize;
        let data_requests = stub.requests_to(ENDPOINT).len();
        assert_eq!(data_requests, (count + page - 1) / page + 1, "requests for {} records", count);
    }
}

#[test]
fn empty_first_page_yields_nothing() {
    let stub = listing(0);
    let mut client = stub.connect();

    let mut pages = client.paginate(ENDPOINT, KEY, None, 10).unwrap();
    assert!(pages.next().is_none());
    assert!(pages.next().is_none());
    assert_eq!(pages.pages_fetched(), 1);
}

#[test]
fn zero_page_size_is_rejected_without_request() {
    let stub = listing(3);
    let mut client = stub.connect();

    let result = client.paginate(ENDPOINT, KEY, None, 0);
    assert!(matches!(result, Err(FolioError::InvalidArgument(_))));
    assert!(stub.requests_to(ENDPOINT).is_empty());
}

#[test]
fn two_pages_of_two_take_three_requests() {
    let stub = listing(4);
    let mut client = stub.connect();

    let collected: Vec<Record> =
        client.paginate(ENDPOINT, KEY, None, 2).unwrap().collect::<Result<_, _>>().unwrap();
    assert_eq!(ids(&collected), (1..=4).map(record_id).collect::<Vec<_>>());

    let requests = stub.requests_to(ENDPOINT);
    assert_eq!(requests.len(), 3);

    let queries: Vec<String> =
        requests.iter().map(|r| query_value(r, "query").unwrap_or_default()).collect();
    assert_eq!(queries[0], "id>00000000-0000-0000-0000-000000000000 sortBy id");
    assert!(queries[1].contains(&format!("id>{}", record_id(2))));
    assert!(queries[2].contains(&format!("id>{}", record_id(4))));

    for request in &requests {
        assert_eq!(query_value(request, "limit").as_deref(), Some("2"));
    }
}

#[test]
fn records_are_fetched_lazily() {
    let stub = listing(10);
    let mut client = stub.connect();

    let first_three: Vec<Record> =
        client.paginate(ENDPOINT, KEY, None, 3).unwrap().take(3).map(Result::unwrap).collect();

    assert_eq!(ids(&first_three), (1..=3).map(record_id).collect::<Vec<_>>());
    assert_eq!(stub.requests_to(ENDPOINT).len(), 1);
}

#[test]
fn filter_is_combined_with_cursor() {
    let stub = listing(2);
    let mut client = stub.connect();

    let collected =
        client.paginate(ENDPOINT, KEY, Some("active==true"), 10).unwrap().collect_all().unwrap();
    assert_eq!(collected.len(), 2);

    let requests = stub.requests_to(ENDPOINT);
    assert_eq!(
        query_value(&requests[0], "query").as_deref(),
        Some("id>00000000-0000-0000-0000-000000000000 AND (active==true) sortBy id")
    );
    assert_eq!(
        query_value(&requests[1], "query"),
        Some(format!("id>{} AND (active==true) sortBy id", record_id(2)))
    );
}

#[test]
fn non_array_page_is_protocol_error_then_fused() {
    let stub = StubServer::with_auth();
    stub.mount(
        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": {"id": "x"}}))),
    );
    let mut client = stub.connect();

    let mut pages = client.paginate(ENDPOINT, KEY, None, 10).unwrap();
    assert!(matches!(pages.next(), Some(Err(FolioError::Protocol(_)))));
    assert!(pages.next().is_none());
    assert!(pages.next().is_none());
    assert_eq!(stub.requests_to(ENDPOINT).len(), 1);
}

#[test]
fn missing_result_key_is_protocol_error() {
    let stub = StubServer::with_auth();
    stub.mount(
        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalRecords": 0}))),
    );
    let mut client = stub.connect();

    let result = client.paginate(ENDPOINT, KEY, None, 10).unwrap().collect_all();
    assert!(matches!(result, Err(FolioError::Protocol(_))));
}

#[test]
fn server_error_mid_walk_is_yielded_once() {
    let stub = StubServer::with_auth();
    let first_page = json!({"users": [{"id": record_id(1)}, {"id": record_id(2)}]});
    stub.mount(
        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .and(query_param("query", "id>00000000-0000-0000-0000-000000000000 sortBy id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(first_page)),
    );
    stub.mount(
        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .and(query_param("query", format!("id>{} sortBy id", record_id(2))))
            .respond_with(ResponseTemplate::new(500).set_body_string("storage unavailable")),
    );
    let mut client = stub.connect();

    let items: Vec<_> = client.paginate(ENDPOINT, KEY, None, 2).unwrap().collect();

    assert_eq!(items.len(), 3);
    assert!(items[0].is_ok());
    assert!(items[1].is_ok());
    assert!(matches!(items[2], Err(FolioError::Http { status: 500, .. })));
}

#[test]
fn record_without_id_ends_walk_after_page() {
    let stub = StubServer::with_auth();
    stub.mount(
        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": [{"id": record_id(1)}, {"username": "no-id"}]
            }))),
    );
    let mut client = stub.connect();

    let collected = client.paginate(ENDPOINT, KEY, None, 2).unwrap().collect_all().unwrap();

    assert_eq!(collected.len(), 2);
    assert_eq!(stub.requests_to(ENDPOINT).len(), 1);
}

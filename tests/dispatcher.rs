mod common;

use std::sync::Arc;

use adspot::domains::chat::{ChatRole, ChatSession};
use adspot::services::dispatcher::{ChatDispatcher, DispatchOutcome};
use adspot::services::queries::QueryService;
use adspot::tools::{ToolRequest, QUERY_COUNT_BY_PROVINCE, QUERY_TABLE_COUNT};
use adspot::Dashboard;

use common::{
    create_table, provider, seed_inventory, temp_database, text_response, tool_response,
    QueueLlmProvider,
};

#[tokio::test]
async fn misspelled_table_is_counted() {
    let (_file, db) = temp_database().await;
    create_table(&db, "province_table", 4).await;
    let llm = provider(vec![tool_response(
        QUERY_TABLE_COUNT,
        r#"{"table_name":"provnce_table"}"#,
    )]);
    let dispatcher = ChatDispatcher::new(llm.clone(), QueryService::new(db));

    let mut session = ChatSession::new();
    let reply = dispatcher
        .handle_turn(&mut session, "how many rows in provnce table")
        .await;
    assert_eq!(reply, "The table 'province_table' has 4 rows.");

    let prompts = llm.prompts.lock().await;
    assert_eq!(prompts[0].0, "how many rows in provnce table");
    assert!(prompts[0]
        .1
        .contains("inventory_table, person_details, province_table"));
}

#[tokio::test]
async fn province_tool_renders_counts() {
    let (_file, db) = temp_database().await;
    seed_inventory(&db).await;
    let dispatcher = ChatDispatcher::new(
        provider(vec![tool_response(QUERY_COUNT_BY_PROVINCE, "{}")]),
        QueryService::new(db.clone()),
    );

    let tables = QueryService::new(db).list_tables().await.unwrap();
    let outcome = dispatcher.dispatch("rows per province?", &tables).await.unwrap();
    match outcome {
        DispatchOutcome::Tool { request, output } => {
            assert_eq!(request, ToolRequest::CountByProvince);
            assert!(output.starts_with("Count of rows per province:\n\nOntario: 3\n"));
        }
        other => panic!("expected tool outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn plain_text_answer_passes_through() {
    let (_file, db) = temp_database().await;
    let dispatcher = ChatDispatcher::new(
        provider(vec![text_response("Hello! Ask me about the inventory.")]),
        QueryService::new(db),
    );
    let mut session = ChatSession::new();
    let reply = dispatcher.handle_turn(&mut session, "hi").await;
    assert_eq!(reply, "Hello! Ask me about the inventory.");
}

#[tokio::test]
async fn missing_table_name_matches_nothing() {
    let (_file, db) = temp_database().await;
    let dispatcher = ChatDispatcher::new(
        provider(vec![tool_response(QUERY_TABLE_COUNT, "{}")]),
        QueryService::new(db),
    );
    let mut session = ChatSession::new();
    let reply = dispatcher.handle_turn(&mut session, "count something").await;
    assert_eq!(reply, "No matching table found for ''.");
}

#[tokio::test]
async fn unknown_tool_runs_nothing() {
    let (_file, db) = temp_database().await;
    let dispatcher = ChatDispatcher::new(
        provider(vec![tool_response("drop_table", r#"{"table_name":"inventory_table"}"#)]),
        QueryService::new(db.clone()),
    );
    let mut session = ChatSession::new();
    let reply = dispatcher.handle_turn(&mut session, "delete it").await;
    assert_eq!(
        reply,
        "The assistant requested an unknown operation 'drop_table'; nothing was run."
    );
    assert_eq!(
        QueryService::new(db).list_tables().await.unwrap(),
        vec!["inventory_table".to_string(), "person_details".to_string()]
    );
}

#[tokio::test]
async fn malformed_arguments_are_reported() {
    let (_file, db) = temp_database().await;
    let dispatcher = ChatDispatcher::new(
        provider(vec![tool_response(QUERY_TABLE_COUNT, "{\"table_name\": ")]),
        QueryService::new(db),
    );
    let mut session = ChatSession::new();
    let reply = dispatcher.handle_turn(&mut session, "count").await;
    assert!(reply.starts_with("Could not decode arguments for 'query_table_count': "));
}

#[tokio::test]
async fn model_failure_becomes_reply() {
    let (_file, db) = temp_database().await;
    let dispatcher = ChatDispatcher::new(
        Arc::new(QueueLlmProvider::failing("connection refused")),
        QueryService::new(db),
    );
    let mut session = ChatSession::new();
    let reply = dispatcher.handle_turn(&mut session, "hi").await;
    assert_eq!(reply, "An error occurred: http error: connection refused");
    assert_eq!(session.len(), 2);
}

#[tokio::test]
async fn only_the_first_tool_call_runs() {
    let (_file, db) = temp_database().await;
    seed_inventory(&db).await;
    let mut response = tool_response(QUERY_TABLE_COUNT, r#"{"table_name":"inventory_table"}"#);
    response
        .tool_calls
        .extend(tool_response("drop_table", "{}").tool_calls);
    let dispatcher = ChatDispatcher::new(provider(vec![response]), QueryService::new(db));

    let mut session = ChatSession::new();
    let reply = dispatcher.handle_turn(&mut session, "count inventory").await;
    assert_eq!(reply, "The table 'inventory_table' has 7 rows.");
}

#[tokio::test]
async fn transcript_grows_across_turns() {
    let (_file, db) = temp_database().await;
    let dashboard = Dashboard::new(
        db,
        provider(vec![
            text_response("first answer"),
            tool_response(QUERY_TABLE_COUNT, r#"{"table_name":"person_details"}"#),
        ]),
    );

    let mut session = ChatSession::new();
    dashboard.chat(&mut session, "hello").await;
    dashboard.chat(&mut session, "how many people?").await;

    let roles: Vec<ChatRole> = session.messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            ChatRole::User,
            ChatRole::Assistant,
            ChatRole::User,
            ChatRole::Assistant
        ]
    );
    assert_eq!(session.messages()[1].content, "first answer");
    assert_eq!(
        session.messages()[3].content,
        "The table 'person_details' has 0 rows."
    );
}

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_category_map, questions},
        NewQuestion, Question,
    },
    server::{
        app::AppState,
        deserializers::{LenientI64, PageQuery},
        pagination::page_window,
    },
    telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED},
};

use super::{ApiError, ApiResponse, IdPath, JsonBody};

/// `searchTerm` of a `POST /questions` body, any non-null value is searched for as text.
fn search_term(body: &Value) -> Option<String> {
    match body.get("searchTerm")? {
        Value::Null => None,
        Value::String(term) => Some(term.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Deserialize)]
struct CreateQuestionRequest {
    question: Option<String>,
    answer: Option<String>,
    difficulty: Option<LenientI64>,
    category: Option<LenientI64>,
}

impl CreateQuestionRequest {
    fn into_new_question(self) -> Option<NewQuestion> {
        Some(NewQuestion {
            question: self.question?,
            answer: self.answer?,
            difficulty: self.difficulty?.0,
            category: self.category?.0,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    categories: BTreeMap<i64, String>,
    current_category: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: i64,
}

#[derive(Serialize)]
struct Created {
    success: bool,
}

#[derive(Serialize)]
struct Deleted {
    success: bool,
    question: Question,
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    Query(query): Query<PageQuery>,
) -> ApiResponse<Json<QuestionsPage>> {
    let total = questions::count_questions(&pool).await?;
    let window = page_window(query.page(), total as usize).ok_or(ApiError::NotFound)?;

    let page = questions::get_questions_page(&pool, window.start as i64, window.len() as i64).await?;
    Ok(Json(QuestionsPage {
        success: true,
        questions: page,
        total_questions: total,
        categories: get_category_map(&pool).await?,
        current_category: questions::first_question_category(&pool).await?,
    }))
}

async fn search_or_create(
    State(pool): State<SqlitePool>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResponse<Response> {
    match search_term(&body) {
        Some(term) => {
            let found = questions::search_questions(&pool, &term).await?;
            let Some(current_category) = found.first().map(|q| q.category) else {
                return Err(ApiError::NotFound);
            };
            Ok(Json(SearchResults {
                success: true,
                total_questions: found.len(),
                questions: found,
                current_category,
            })
            .into_response())
        }
        None => {
            let new_question = serde_json::from_value::<CreateQuestionRequest>(body)
                .ok()
                .and_then(CreateQuestionRequest::into_new_question)
                .ok_or(ApiError::Unprocessable)?;
            let id = questions::create_question(&pool, &new_question)
                .await
                .map_err(|e| ApiError::Internal(e.into()))?;
            QUESTIONS_CREATED.inc();
            tracing::info!("Created question {id}");
            Ok((StatusCode::CREATED, Json(Created { success: true })).into_response())
        }
    }
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    IdPath(id): IdPath,
) -> ApiResponse<Json<Deleted>> {
    // a missing question is reported as 422, not 404
    let question = questions::get_question_by_id(&pool, id)
        .await?
        .ok_or(ApiError::Unprocessable)?;

    questions::delete_question(&pool, id)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    QUESTIONS_DELETED.inc();
    tracing::info!("Deleted question {id}");

    Ok(Json(Deleted {
        success: true,
        question,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(search_or_create))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    configuration::QuizSettings,
    db::{queries::questions::next_quiz_question, Question},
    server::{app::AppState, deserializers::LenientI64},
    telemetry::{QUIZZES_EXHAUSTED, QUIZ_QUESTIONS_SERVED},
};

use super::{ApiError, ApiResponse, JsonBody};

#[derive(Deserialize)]
struct QuizRequest {
    quiz_category: Option<QuizCategory>,
    previous_questions: Option<Vec<LenientI64>>,
}

// the frontend also sends the category "type", only the id matters
#[derive(Deserialize)]
struct QuizCategory {
    id: Option<LenientI64>,
}

#[derive(Serialize)]
struct NextQuestion {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    question: Option<Question>,
}

async fn next_question(
    State(pool): State<SqlitePool>,
    State(quiz): State<QuizSettings>,
    JsonBody(body): JsonBody<QuizRequest>,
) -> ApiResponse<Json<NextQuestion>> {
    let (Some(category), Some(previous)) = (body.quiz_category, body.previous_questions) else {
        return Err(ApiError::Unprocessable);
    };
    let LenientI64(category_id) = category.id.ok_or(ApiError::Unprocessable)?;
    let previous: Vec<i64> = previous.into_iter().map(|id| id.0).collect();

    let question = next_quiz_question(&pool, category_id, &previous, quiz.randomize).await?;
    match &question {
        Some(q) => {
            QUIZ_QUESTIONS_SERVED.inc();
            tracing::debug!("Serving question {} for category {category_id}", q.id);
        }
        None => {
            QUIZZES_EXHAUSTED.inc();
            tracing::debug!("No questions left in category {category_id}");
        }
    }

    Ok(Json(NextQuestion {
        success: question.is_some(),
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_question))
        .with_state(state)
}

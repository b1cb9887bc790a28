use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

pub async fn get_all_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn count_questions(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await
}

pub async fn get_questions_page(
    pool: &SqlitePool,
    offset: i64,
    limit: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        ORDER BY id
        LIMIT ?1 OFFSET ?2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Category of the lowest-id question in the whole table.
pub async fn first_question_category(pool: &SqlitePool) -> sqlx::Result<Option<i64>> {
    sqlx::query_scalar::<_, i64>("SELECT category FROM questions ORDER BY id LIMIT 1")
        .fetch_optional(pool)
        .await
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        WHERE category = ?1
        ORDER BY id
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await
}

/// Case-insensitive substring match on the question text.
///
/// sqlite only folds ASCII in `lower()` and `LIKE`, so the match runs on Unicode-lowercased text here.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<Question>> {
    let needle = term.to_lowercase();
    let questions = get_all_questions(pool).await?;
    Ok(questions
        .into_iter()
        .filter(|q| q.question.to_lowercase().contains(&needle))
        .collect())
}

pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create_question(pool: &SqlitePool, question: &NewQuestion) -> sqlx::Result<i64> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&question.question)
    .bind(&question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .execute(&mut *tx)
    .await;

    match inserted {
        Ok(result) => {
            tx.commit().await?;
            Ok(result.last_insert_rowid())
        }
        Err(e) => {
            tracing::warn!("Rolling back question insert: {e}");
            tx.rollback().await?;
            Err(e)
        }
    }
}

pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM questions WHERE id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await;

    match deleted {
        Ok(_) => {
            tx.commit().await?;
            Ok(())
        }
        Err(e) => {
            tracing::warn!("Rolling back delete of question {id}: {e}");
            tx.rollback().await?;
            Err(e)
        }
    }
}

/// Next quiz question of `category` whose id is not in `previous`.
///
/// Without `randomize` the lowest remaining id wins, otherwise sqlite picks one at random.
pub async fn next_quiz_question(
    pool: &SqlitePool,
    category: i64,
    previous: &[i64],
    randomize: bool,
) -> sqlx::Result<Option<Question>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, question, answer, category, difficulty FROM questions WHERE category = ",
    );
    query.push_bind(category);
    if !previous.is_empty() {
        query.push(" AND id NOT IN (");
        let mut ids = query.separated(", ");
        for id in previous {
            ids.push_bind(*id);
        }
        ids.push_unseparated(")");
    }
    if randomize {
        query.push(" ORDER BY RANDOM()");
    } else {
        query.push(" ORDER BY id");
    }
    query.push(" LIMIT 1");

    query.build_query_as::<Question>().fetch_optional(pool).await
}

/// Inserts or replaces questions by id in a single transaction.
pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for question in questions {
        sqlx::query(
            r#"
            INSERT INTO questions (id, question, answer, category, difficulty)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (id) DO UPDATE SET
                question = excluded.question,
                answer = excluded.answer,
                category = excluded.category,
                difficulty = excluded.difficulty
            "#,
        )
        .bind(question.id)
        .bind(&question.question)
        .bind(&question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{memory_pool, seeded_pool};

    fn new_question(text: &str, category: i64) -> NewQuestion {
        NewQuestion {
            question: text.to_owned(),
            answer: "answer".to_owned(),
            category,
            difficulty: 3,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_question() {
        let pool = memory_pool().await;
        let id = create_question(&pool, &new_question("Who painted the Mona Lisa?", 2))
            .await
            .unwrap();

        let stored = get_question_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(stored.question, "Who painted the Mona Lisa?");
        assert_eq!(stored.category, 2);
        assert_eq!(stored.difficulty, 3);
    }

    #[tokio::test]
    async fn test_create_question_with_unknown_category() {
        let pool = memory_pool().await;
        let id = create_question(&pool, &new_question("Orphan?", 999))
            .await
            .unwrap();
        assert_eq!(
            get_question_by_id(&pool, id).await.unwrap().unwrap().category,
            999
        );
    }

    #[tokio::test]
    async fn test_delete_question() {
        let pool = seeded_pool(3).await;
        delete_question(&pool, 2).await.unwrap();

        assert!(get_question_by_id(&pool, 2).await.unwrap().is_none());
        assert_eq!(count_questions(&pool).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_questions_page_and_first_category() {
        let pool = seeded_pool(15).await;
        assert_eq!(first_question_category(&pool).await.unwrap(), Some(1));

        let page = get_questions_page(&pool, 10, 4).await.unwrap();
        let ids: Vec<i64> = page.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![11, 12, 13, 14]);
    }

    #[tokio::test]
    async fn test_first_question_category_empty() {
        let pool = memory_pool().await;
        assert_eq!(first_question_category(&pool).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_questions_for_category() {
        let pool = seeded_pool(9).await;
        let questions = get_questions_for_category(&pool, 2).await.unwrap();
        assert_eq!(questions.len(), 3);
        assert!(questions.iter().all(|q| q.category == 2));
        assert!(get_questions_for_category(&pool, 42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let pool = memory_pool().await;
        create_question(&pool, &new_question("What is the largest lake in Africa?", 3))
            .await
            .unwrap();
        create_question(&pool, &new_question("Who discovered penicillin?", 1))
            .await
            .unwrap();

        let found = search_questions(&pool, "LARGEST").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category, 3);

        assert_eq!(search_questions(&pool, "").await.unwrap().len(), 2);
        assert!(search_questions(&pool, "no such text").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let pool = memory_pool().await;
        create_question(&pool, &new_question("Where is the ÉCOLE Polytechnique?", 3))
            .await
            .unwrap();
        create_question(&pool, &new_question("Wer schrieb den ZAUBERBERG über Davos?", 2))
            .await
            .unwrap();

        let found = search_questions(&pool, "école").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category, 3);

        let found = search_questions(&pool, "ÜBER").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category, 2);

        // wildcard characters are plain text
        assert!(search_questions(&pool, "%").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_next_quiz_question_skips_previous() {
        let pool = seeded_pool(9).await;
        // category 1 holds ids 1, 4, 7
        let first = next_quiz_question(&pool, 1, &[], false).await.unwrap().unwrap();
        assert_eq!(first.id, 1);

        let next = next_quiz_question(&pool, 1, &[1, 4], false)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next.id, 7);

        let exhausted = next_quiz_question(&pool, 1, &[1, 4, 7], false).await.unwrap();
        assert!(exhausted.is_none());
    }

    #[tokio::test]
    async fn test_next_quiz_question_randomized_stays_in_category() {
        let pool = seeded_pool(9).await;
        for _ in 0..10 {
            let question = next_quiz_question(&pool, 2, &[2], true)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(question.category, 2);
            assert_ne!(question.id, 2);
        }
    }

    #[tokio::test]
    async fn test_import_questions_upserts() {
        let pool = seeded_pool(2).await;
        let mut questions = get_all_questions(&pool).await.unwrap();
        questions[0].answer = "changed".to_owned();
        questions.push(Question {
            id: 50,
            question: "Imported?".to_owned(),
            answer: "yes".to_owned(),
            category: 4,
            difficulty: 1,
        });
        import_questions(&pool, questions).await.unwrap();

        let stored = get_all_questions(&pool).await.unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0].answer, "changed");
        assert_eq!(stored[2].id, 50);
    }
}

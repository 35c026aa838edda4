use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use hostel_core::domain::{CategoryTotal, Expense, ExpenseSummary, NewExpense, ReportScope};
use hostel_core::error::DomainError;
use hostel_core::repositories::ExpenseRepository;

use super::db_error;

pub struct PgExpenseRepository {
    pool: PgPool,
}

impl PgExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ExpenseRow {
    pub id: i32,
    pub hostel_id: i32,
    pub semester_id: i32,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub recorded_by: i32,
    pub expense_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<ExpenseRow> for Expense {
    fn from(row: ExpenseRow) -> Self {
        Expense {
            id: row.id,
            hostel_id: row.hostel_id,
            semester_id: row.semester_id,
            amount: row.amount,
            description: row.description,
            category: row.category,
            recorded_by: row.recorded_by,
            expense_date: row.expense_date,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    pub category: String,
    pub total: Decimal,
    pub count: i64,
}

#[async_trait]
impl ExpenseRepository for PgExpenseRepository {
    async fn create(&self, expense: &NewExpense) -> Result<Expense, DomainError> {
        let row: ExpenseRow = sqlx::query_as(
            r#"
            INSERT INTO expenses (hostel_id, semester_id, amount, description, category, recorded_by, expense_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, hostel_id, semester_id, amount, description, category,
                      recorded_by, expense_date, created_at
            "#,
        )
        .bind(expense.hostel_id)
        .bind(expense.semester_id)
        .bind(expense.amount)
        .bind(&expense.description)
        .bind(&expense.category)
        .bind(expense.recorded_by)
        .bind(expense.expense_date)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("creating expense"))?;

        Ok(row.into())
    }

    async fn list(&self, scope: &ReportScope) -> Result<Vec<Expense>, DomainError> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(
            r#"
            SELECT id, hostel_id, semester_id, amount, description, category,
                   recorded_by, expense_date, created_at
            FROM expenses
            WHERE semester_id = $1
              AND ($2::int IS NULL OR hostel_id = $2)
            ORDER BY expense_date DESC, id DESC
            "#,
        )
        .bind(scope.semester_id)
        .bind(scope.hostel_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing expenses"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn summary(&self, scope: &ReportScope) -> Result<ExpenseSummary, DomainError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            r#"
            SELECT category, SUM(amount) AS total, COUNT(*) AS count
            FROM expenses
            WHERE semester_id = $1
              AND ($2::int IS NULL OR hostel_id = $2)
            GROUP BY category
            ORDER BY category
            "#,
        )
        .bind(scope.semester_id)
        .bind(scope.hostel_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("summarising expenses"))?;

        let by_category: Vec<CategoryTotal> = rows
            .into_iter()
            .map(|r| CategoryTotal {
                category: r.category,
                total: r.total,
                count: r.count,
            })
            .collect();

        Ok(ExpenseSummary {
            semester_id: Some(scope.semester_id),
            total: by_category.iter().map(|c| c.total).sum(),
            count: by_category.iter().map(|c| c.count).sum(),
            by_category,
        })
    }
}

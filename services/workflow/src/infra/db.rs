use std::collections::HashMap;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use dmrt_domain::role::Role;
use dmrt_domain::submission::SubmissionStatus;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use dmrt_workflow_schema::{auth_codes, leader_approvals, submissions};

use crate::domain::repository::{AuthCodeRepository, SubmissionRepository};
use crate::domain::types::{AuthCode, LeaderApproval, Submission, TransitionExtra};
use crate::error::WorkflowError;

// ── AuthCode repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuthCodeRepository {
    pub db: DatabaseConnection,
}

impl AuthCodeRepository for DbAuthCodeRepository {
    async fn create(&self, code: &AuthCode) -> Result<(), WorkflowError> {
        auth_codes::ActiveModel {
            id: Set(code.id),
            code: Set(code.code.clone()),
            email: Set(code.email.clone()),
            role: Set(code.role.as_str().to_owned()),
            submission_id: Set(code.submission_id),
            expires_at: Set(code.expires_at),
            used: Set(false),
            created_at: Set(code.created_at),
        }
        .insert(&self.db)
        .await
        .context("insert authcode")?;
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<AuthCode>, WorkflowError> {
        let model = auth_codes::Entity::find()
            .filter(auth_codes::Column::Code.eq(code))
            .one(&self.db)
            .await
            .context("find authcode")?;
        model.map(authcode_from_model).transpose()
    }

    async fn mark_used(&self, code: &str, now: DateTime<Utc>) -> Result<bool, WorkflowError> {
        // UPDATE ... WHERE code = $1 AND used = false AND expires_at >= $2
        let result = auth_codes::Entity::update_many()
            .col_expr(auth_codes::Column::Used, Expr::value(true))
            .filter(auth_codes::Column::Code.eq(code))
            .filter(auth_codes::Column::Used.eq(false))
            .filter(auth_codes::Column::ExpiresAt.gte(now))
            .exec(&self.db)
            .await
            .context("mark authcode used")?;
        Ok(result.rows_affected == 1)
    }
}

fn authcode_from_model(model: auth_codes::Model) -> Result<AuthCode, WorkflowError> {
    Ok(AuthCode {
        id: model.id,
        role: model
            .role
            .parse::<Role>()
            .context("decode authcode role")?,
        code: model.code,
        email: model.email,
        submission_id: model.submission_id,
        expires_at: model.expires_at,
        used: model.used,
        created_at: model.created_at,
    })
}

// ── Submission repository ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSubmissionRepository {
    pub db: DatabaseConnection,
}

impl SubmissionRepository for DbSubmissionRepository {
    async fn create(&self, submission: &Submission) -> Result<(), WorkflowError> {
        submissions::ActiveModel {
            id: Set(submission.id),
            submitted_by_email: Set(submission.submitted_by_email.clone()),
            notes: Set(submission.notes.clone()),
            final_post_text: Set(submission.final_post_text.clone()),
            edited_by_pro: Set(submission.edited_by_pro.clone()),
            status: Set(submission.status.as_str().to_owned()),
            created_at: Set(submission.created_at),
            updated_at: Set(submission.updated_at),
            posted_at: Set(submission.posted_at),
        }
        .insert(&self.db)
        .await
        .context("insert submission")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Submission>, WorkflowError> {
        let model = submissions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find submission by id")?;
        let Some(model) = model else {
            return Ok(None);
        };
        let mut approvals = self.approvals_for(&[model.id]).await?;
        let approvals = approvals.remove(&model.id).unwrap_or_default();
        submission_from_model(model, approvals).map(Some)
    }

    async fn list(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<Submission>, WorkflowError> {
        let mut query = submissions::Entity::find();
        if let Some(status) = status {
            query = query.filter(submissions::Column::Status.eq(status.as_str()));
        }
        let models = query
            .order_by_desc(submissions::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list submissions")?;
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut approvals = self.approvals_for(&ids).await?;
        models
            .into_iter()
            .map(|m| {
                let history = approvals.remove(&m.id).unwrap_or_default();
                submission_from_model(m, history)
            })
            .collect()
    }

    async fn transition(
        &self,
        id: Uuid,
        from: SubmissionStatus,
        to: SubmissionStatus,
        extra: &TransitionExtra,
    ) -> Result<bool, WorkflowError> {
        let extra = extra.clone();
        let applied = self
            .db
            .transaction::<_, bool, sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    // UPDATE ... WHERE id = $1 AND status = $from
                    let mut update = submissions::Entity::update_many()
                        .col_expr(submissions::Column::Status, Expr::value(to.as_str()))
                        .col_expr(submissions::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(submissions::Column::Id.eq(id))
                        .filter(submissions::Column::Status.eq(from.as_str()));
                    if let Some(text) = extra.edited_by_pro {
                        update = update.col_expr(submissions::Column::EditedByPro, Expr::value(text));
                    }
                    if let Some(posted_at) = extra.posted_at {
                        update =
                            update.col_expr(submissions::Column::PostedAt, Expr::value(posted_at));
                    }
                    let result = update.exec(txn).await?;
                    if result.rows_affected != 1 {
                        return Ok(false);
                    }

                    if let Some(approval) = extra.approval {
                        leader_approvals::ActiveModel {
                            id: Set(approval.id),
                            submission_id: Set(id),
                            leader_email: Set(approval.leader_email),
                            approved: Set(approval.approved),
                            comment: Set(approval.comment),
                            created_at: Set(approval.created_at),
                        }
                        .insert(txn)
                        .await?;
                    }
                    Ok(true)
                })
            })
            .await
            .context("transition submission")?;
        Ok(applied)
    }
}

impl DbSubmissionRepository {
    /// Decision history keyed by submission, oldest first.
    async fn approvals_for(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<LeaderApproval>>, WorkflowError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let models = leader_approvals::Entity::find()
            .filter(leader_approvals::Column::SubmissionId.is_in(ids.to_vec()))
            .order_by_asc(leader_approvals::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list leader approvals")?;

        let mut grouped: HashMap<Uuid, Vec<LeaderApproval>> = HashMap::new();
        for m in models {
            grouped.entry(m.submission_id).or_default().push(LeaderApproval {
                id: m.id,
                submission_id: m.submission_id,
                leader_email: m.leader_email,
                approved: m.approved,
                comment: m.comment,
                created_at: m.created_at,
            });
        }
        Ok(grouped)
    }
}

fn submission_from_model(
    model: submissions::Model,
    leader_approvals: Vec<LeaderApproval>,
) -> Result<Submission, WorkflowError> {
    Ok(Submission {
        id: model.id,
        status: model
            .status
            .parse::<SubmissionStatus>()
            .context("decode submission status")?,
        submitted_by_email: model.submitted_by_email,
        notes: model.notes,
        final_post_text: model.final_post_text,
        edited_by_pro: model.edited_by_pro,
        created_at: model.created_at,
        updated_at: model.updated_at,
        posted_at: model.posted_at,
        leader_approvals,
    })
}

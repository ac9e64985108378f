//! Repository module
//!
//! Async storage seams for the financial aggregates and for the two
//! collaborator records (budgets, payroll timesheets) the choreography reads.
//! `postgres` is the production implementation; `memory` backs tests and
//! local runs without a database.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::aggregate::{ContaPagar, ContaReceber, CronogramaRecebimento};
use crate::domain::{StatusContaPagar, StatusContaReceber};

pub use memory::{
    MemoryApontamentoRepository, MemoryContaPagarRepository, MemoryContaReceberRepository,
    MemoryCronogramaRepository, MemoryOrcamentoRepository,
};
pub use postgres::{
    PgApontamentoRepository, PgContaPagarRepository, PgContaReceberRepository,
    PgCronogramaRepository, PgOrcamentoRepository,
};

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Storage failures
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped back to its aggregate
    #[error("Corrupted row: {0}")]
    CorruptedRow(String),

    /// An update matched no row
    #[error("{entidade} {id} not found")]
    NotFound { entidade: &'static str, id: Uuid },

    /// An active record already exists for the same source document
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Postgres `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

impl RepositoryError {
    /// Classify an insert failure, turning unique violations into `Conflict`
    pub(crate) fn from_insert(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Self::Conflict(db.message().to_string())
            }
            _ => Self::Database(err),
        }
    }

    pub(crate) fn check_updated(
        rows_affected: u64,
        entidade: &'static str,
        id: Uuid,
    ) -> RepositoryResult<()> {
        if rows_affected == 0 {
            return Err(Self::NotFound { entidade, id });
        }
        Ok(())
    }
}

/// Default page size for listings
pub const DEFAULT_LIMIT: i64 = 50;

/// Upper bound for a single page
pub const MAX_LIMIT: i64 = 500;

/// Listing filter shared by payables and receivables
#[derive(Debug, Clone, PartialEq)]
pub struct FiltroContas<S> {
    pub status: Option<S>,
    pub obra_id: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

impl<S> Default for FiltroContas<S> {
    fn default() -> Self {
        Self {
            status: None,
            obra_id: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl<S> FiltroContas<S> {
    /// Clamp limit/offset into a sane window
    pub fn normalizado(mut self) -> Self {
        self.limit = self.limit.clamp(1, MAX_LIMIT);
        self.offset = self.offset.max(0);
        self
    }
}

/// Budget fields the payable choreography needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrcamentoResumo {
    pub id: Uuid,
    pub obra_id: Option<Uuid>,
    pub etapa_id: Option<Uuid>,
    pub fornecedor_id: Option<Uuid>,
    pub fornecedor_nome: String,
    pub status: String,
    pub valor: Decimal,
    pub numero_documento: Option<String>,
    pub data_pagamento_prevista: Option<DateTime<Utc>>,
    pub excluido: bool,
}

/// Payroll timesheet fields the payable choreography needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApontamentoResumo {
    pub id: Uuid,
    pub funcionario_id: Uuid,
    pub funcionario_nome: String,
    pub obra_id: Option<Uuid>,
    pub periodo_inicio: DateTime<Utc>,
    pub periodo_fim: DateTime<Utc>,
    pub valor_total: Decimal,
    pub status: String,
}

/// Status labels a timesheet moves through
pub mod status_apontamento {
    pub const PENDENTE: &str = "PENDENTE";
    pub const APROVADO: &str = "APROVADO";
    pub const PAGO: &str = "PAGO";
}

#[async_trait]
pub trait ContaPagarRepository: Send + Sync {
    async fn inserir(&self, conta: &ContaPagar) -> RepositoryResult<()>;

    async fn atualizar(&self, conta: &ContaPagar) -> RepositoryResult<()>;

    async fn buscar(&self, id: Uuid) -> RepositoryResult<Option<ContaPagar>>;

    async fn listar(
        &self,
        filtro: &FiltroContas<StatusContaPagar>,
    ) -> RepositoryResult<Vec<ContaPagar>>;

    /// Payables derived from a budget, oldest first
    async fn listar_por_orcamento(&self, orcamento_id: Uuid) -> RepositoryResult<Vec<ContaPagar>>;

    /// Payables derived from a payroll timesheet, oldest first
    async fn listar_por_apontamento(
        &self,
        apontamento_id: Uuid,
    ) -> RepositoryResult<Vec<ContaPagar>>;

    /// PENDENTE payables due before `agora`
    async fn listar_pendentes_vencidas(
        &self,
        agora: DateTime<Utc>,
    ) -> RepositoryResult<Vec<ContaPagar>>;
}

#[async_trait]
pub trait ContaReceberRepository: Send + Sync {
    async fn inserir(&self, conta: &ContaReceber) -> RepositoryResult<()>;

    async fn atualizar(&self, conta: &ContaReceber) -> RepositoryResult<()>;

    async fn buscar(&self, id: Uuid) -> RepositoryResult<Option<ContaReceber>>;

    async fn listar(
        &self,
        filtro: &FiltroContas<StatusContaReceber>,
    ) -> RepositoryResult<Vec<ContaReceber>>;

    /// Receivables linked to a schedule line, oldest first
    async fn listar_por_cronograma(
        &self,
        cronograma_recebimento_id: Uuid,
    ) -> RepositoryResult<Vec<ContaReceber>>;

    async fn listar_pendentes_vencidas(
        &self,
        agora: DateTime<Utc>,
    ) -> RepositoryResult<Vec<ContaReceber>>;
}

#[async_trait]
pub trait CronogramaRepository: Send + Sync {
    /// Insert a batch of lines atomically
    async fn inserir_lote(&self, linhas: &[CronogramaRecebimento]) -> RepositoryResult<()>;

    async fn atualizar(&self, linha: &CronogramaRecebimento) -> RepositoryResult<()>;

    async fn buscar(&self, id: Uuid) -> RepositoryResult<Option<CronogramaRecebimento>>;

    /// Lines of a project ordered by step number
    async fn listar_por_obra(&self, obra_id: Uuid) -> RepositoryResult<Vec<CronogramaRecebimento>>;

    async fn listar_pendentes_vencidos(
        &self,
        agora: DateTime<Utc>,
    ) -> RepositoryResult<Vec<CronogramaRecebimento>>;
}

#[async_trait]
pub trait OrcamentoRepository: Send + Sync {
    /// Budget summary; soft-deleted budgets are returned with `excluido = true`
    async fn buscar_resumo(&self, id: Uuid) -> RepositoryResult<Option<OrcamentoResumo>>;

    async fn atualizar_status(&self, id: Uuid, status: &str) -> RepositoryResult<()>;

    async fn marcar_excluido(&self, id: Uuid) -> RepositoryResult<()>;
}

#[async_trait]
pub trait ApontamentoRepository: Send + Sync {
    async fn buscar_resumo(&self, id: Uuid) -> RepositoryResult<Option<ApontamentoResumo>>;

    async fn atualizar_status(&self, id: Uuid, status: &str) -> RepositoryResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_normalization() {
        let filtro = FiltroContas::<StatusContaPagar> {
            limit: 10_000,
            offset: -5,
            ..Default::default()
        }
        .normalizado();

        assert_eq!(filtro.limit, MAX_LIMIT);
        assert_eq!(filtro.offset, 0);

        let filtro = FiltroContas::<StatusContaPagar> {
            limit: 0,
            ..Default::default()
        }
        .normalizado();
        assert_eq!(filtro.limit, 1);
    }

    #[test]
    fn test_filter_default() {
        let filtro = FiltroContas::<StatusContaReceber>::default();
        assert_eq!(filtro.limit, DEFAULT_LIMIT);
        assert!(filtro.status.is_none());
    }
}

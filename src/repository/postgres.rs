//! PostgreSQL repositories
//!
//! Statuses and categories are stored as TEXT and mapped through the enums'
//! `as_str`/`FromStr`; an unknown label surfaces as `CorruptedRow`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::aggregate::{
    ContaPagar, ContaPagarEstado, ContaReceber, ContaReceberEstado, CronogramaRecebimento,
    CronogramaRecebimentoEstado,
};
use crate::domain::{StatusContaPagar, StatusContaReceber, UnknownVariant};

use super::{
    ApontamentoRepository, ApontamentoResumo, ContaPagarRepository, ContaReceberRepository,
    CronogramaRepository, FiltroContas, OrcamentoRepository, OrcamentoResumo, RepositoryError,
    RepositoryResult,
};

impl From<UnknownVariant> for RepositoryError {
    fn from(err: UnknownVariant) -> Self {
        RepositoryError::CorruptedRow(err.to_string())
    }
}

// =========================================================================
// Contas a pagar
// =========================================================================

const CONTA_PAGAR_COLUMNS: &str = r#"
    id, fornecedor_id, obra_id, orcamento_id, apontamento_id, fornecedor_nome,
    categoria, descricao, valor_original, valor_pago, data_vencimento,
    data_pagamento, status, forma_pagamento, numero_documento, observacoes,
    motivo_cancelamento, created_at, updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct ContaPagarRow {
    id: Uuid,
    fornecedor_id: Option<Uuid>,
    obra_id: Option<Uuid>,
    orcamento_id: Option<Uuid>,
    apontamento_id: Option<Uuid>,
    fornecedor_nome: String,
    categoria: String,
    descricao: String,
    valor_original: Decimal,
    valor_pago: Decimal,
    data_vencimento: DateTime<Utc>,
    data_pagamento: Option<DateTime<Utc>>,
    status: String,
    forma_pagamento: Option<String>,
    numero_documento: Option<String>,
    observacoes: Option<String>,
    motivo_cancelamento: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContaPagarRow> for ContaPagar {
    type Error = RepositoryError;

    fn try_from(row: ContaPagarRow) -> Result<Self, Self::Error> {
        Ok(ContaPagar::from_db_state(ContaPagarEstado {
            id: row.id,
            fornecedor_id: row.fornecedor_id,
            obra_id: row.obra_id,
            orcamento_id: row.orcamento_id,
            apontamento_id: row.apontamento_id,
            fornecedor_nome: row.fornecedor_nome,
            categoria: row.categoria.parse()?,
            descricao: row.descricao,
            valor_original: row.valor_original,
            valor_pago: row.valor_pago,
            data_vencimento: row.data_vencimento,
            data_pagamento: row.data_pagamento,
            status: row.status.parse()?,
            forma_pagamento: row.forma_pagamento,
            numero_documento: row.numero_documento,
            observacoes: row.observacoes,
            motivo_cancelamento: row.motivo_cancelamento,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}

fn contas_pagar(rows: Vec<ContaPagarRow>) -> RepositoryResult<Vec<ContaPagar>> {
    rows.into_iter().map(ContaPagar::try_from).collect()
}

#[derive(Debug, Clone)]
pub struct PgContaPagarRepository {
    pool: PgPool,
}

impl PgContaPagarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContaPagarRepository for PgContaPagarRepository {
    async fn inserir(&self, conta: &ContaPagar) -> RepositoryResult<()> {
        let e = conta.estado();
        sqlx::query(
            r#"
            INSERT INTO contas_pagar (
                id, fornecedor_id, obra_id, orcamento_id, apontamento_id, fornecedor_nome,
                categoria, descricao, valor_original, valor_pago, data_vencimento,
                data_pagamento, status, forma_pagamento, numero_documento, observacoes,
                motivo_cancelamento, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(e.id)
        .bind(e.fornecedor_id)
        .bind(e.obra_id)
        .bind(e.orcamento_id)
        .bind(e.apontamento_id)
        .bind(&e.fornecedor_nome)
        .bind(e.categoria.as_str())
        .bind(&e.descricao)
        .bind(e.valor_original)
        .bind(e.valor_pago)
        .bind(e.data_vencimento)
        .bind(e.data_pagamento)
        .bind(e.status.as_str())
        .bind(&e.forma_pagamento)
        .bind(&e.numero_documento)
        .bind(&e.observacoes)
        .bind(&e.motivo_cancelamento)
        .bind(e.created_at)
        .bind(e.updated_at)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from_insert)?;

        Ok(())
    }

    async fn atualizar(&self, conta: &ContaPagar) -> RepositoryResult<()> {
        let e = conta.estado();
        let result = sqlx::query(
            r#"
            UPDATE contas_pagar
            SET valor_pago = $2,
                data_pagamento = $3,
                status = $4,
                forma_pagamento = $5,
                observacoes = $6,
                motivo_cancelamento = $7,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(e.id)
        .bind(e.valor_pago)
        .bind(e.data_pagamento)
        .bind(e.status.as_str())
        .bind(&e.forma_pagamento)
        .bind(&e.observacoes)
        .bind(&e.motivo_cancelamento)
        .bind(e.updated_at)
        .execute(&self.pool)
        .await?;

        RepositoryError::check_updated(result.rows_affected(), "ContaPagar", e.id)
    }

    async fn buscar(&self, id: Uuid) -> RepositoryResult<Option<ContaPagar>> {
        let sql = format!("SELECT {} FROM contas_pagar WHERE id = $1", CONTA_PAGAR_COLUMNS);
        let row: Option<ContaPagarRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ContaPagar::try_from).transpose()
    }

    async fn listar(
        &self,
        filtro: &FiltroContas<StatusContaPagar>,
    ) -> RepositoryResult<Vec<ContaPagar>> {
        let sql = format!(
            r#"
            SELECT {} FROM contas_pagar
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR obra_id = $2)
            ORDER BY data_vencimento ASC
            LIMIT $3 OFFSET $4
            "#,
            CONTA_PAGAR_COLUMNS
        );
        let rows: Vec<ContaPagarRow> = sqlx::query_as(&sql)
            .bind(filtro.status.map(|s| s.as_str()))
            .bind(filtro.obra_id)
            .bind(filtro.limit)
            .bind(filtro.offset)
            .fetch_all(&self.pool)
            .await?;

        contas_pagar(rows)
    }

    async fn listar_por_orcamento(&self, orcamento_id: Uuid) -> RepositoryResult<Vec<ContaPagar>> {
        let sql = format!(
            "SELECT {} FROM contas_pagar WHERE orcamento_id = $1 ORDER BY created_at ASC",
            CONTA_PAGAR_COLUMNS
        );
        let rows: Vec<ContaPagarRow> = sqlx::query_as(&sql)
            .bind(orcamento_id)
            .fetch_all(&self.pool)
            .await?;

        contas_pagar(rows)
    }

    async fn listar_por_apontamento(
        &self,
        apontamento_id: Uuid,
    ) -> RepositoryResult<Vec<ContaPagar>> {
        let sql = format!(
            "SELECT {} FROM contas_pagar WHERE apontamento_id = $1 ORDER BY created_at ASC",
            CONTA_PAGAR_COLUMNS
        );
        let rows: Vec<ContaPagarRow> = sqlx::query_as(&sql)
            .bind(apontamento_id)
            .fetch_all(&self.pool)
            .await?;

        contas_pagar(rows)
    }

    async fn listar_pendentes_vencidas(
        &self,
        agora: DateTime<Utc>,
    ) -> RepositoryResult<Vec<ContaPagar>> {
        let sql = format!(
            r#"
            SELECT {} FROM contas_pagar
            WHERE status = $1 AND data_vencimento < $2
            ORDER BY data_vencimento ASC
            "#,
            CONTA_PAGAR_COLUMNS
        );
        let rows: Vec<ContaPagarRow> = sqlx::query_as(&sql)
            .bind(StatusContaPagar::Pendente.as_str())
            .bind(agora)
            .fetch_all(&self.pool)
            .await?;

        contas_pagar(rows)
    }
}

// =========================================================================
// Contas a receber
// =========================================================================

const CONTA_RECEBER_COLUMNS: &str = r#"
    id, obra_id, cronograma_recebimento_id, cliente, descricao, valor_original,
    valor_recebido, data_vencimento, data_recebimento, status, forma_pagamento,
    numero_documento, observacoes, motivo_cancelamento, created_at, updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct ContaReceberRow {
    id: Uuid,
    obra_id: Option<Uuid>,
    cronograma_recebimento_id: Option<Uuid>,
    cliente: String,
    descricao: String,
    valor_original: Decimal,
    valor_recebido: Decimal,
    data_vencimento: DateTime<Utc>,
    data_recebimento: Option<DateTime<Utc>>,
    status: String,
    forma_pagamento: Option<String>,
    numero_documento: Option<String>,
    observacoes: Option<String>,
    motivo_cancelamento: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContaReceberRow> for ContaReceber {
    type Error = RepositoryError;

    fn try_from(row: ContaReceberRow) -> Result<Self, Self::Error> {
        Ok(ContaReceber::from_db_state(ContaReceberEstado {
            id: row.id,
            obra_id: row.obra_id,
            cronograma_recebimento_id: row.cronograma_recebimento_id,
            cliente: row.cliente,
            descricao: row.descricao,
            valor_original: row.valor_original,
            valor_recebido: row.valor_recebido,
            data_vencimento: row.data_vencimento,
            data_recebimento: row.data_recebimento,
            status: row.status.parse()?,
            forma_pagamento: row.forma_pagamento,
            numero_documento: row.numero_documento,
            observacoes: row.observacoes,
            motivo_cancelamento: row.motivo_cancelamento,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}

fn contas_receber(rows: Vec<ContaReceberRow>) -> RepositoryResult<Vec<ContaReceber>> {
    rows.into_iter().map(ContaReceber::try_from).collect()
}

#[derive(Debug, Clone)]
pub struct PgContaReceberRepository {
    pool: PgPool,
}

impl PgContaReceberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContaReceberRepository for PgContaReceberRepository {
    async fn inserir(&self, conta: &ContaReceber) -> RepositoryResult<()> {
        let e = conta.estado();
        sqlx::query(
            r#"
            INSERT INTO contas_receber (
                id, obra_id, cronograma_recebimento_id, cliente, descricao, valor_original,
                valor_recebido, data_vencimento, data_recebimento, status, forma_pagamento,
                numero_documento, observacoes, motivo_cancelamento, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(e.id)
        .bind(e.obra_id)
        .bind(e.cronograma_recebimento_id)
        .bind(&e.cliente)
        .bind(&e.descricao)
        .bind(e.valor_original)
        .bind(e.valor_recebido)
        .bind(e.data_vencimento)
        .bind(e.data_recebimento)
        .bind(e.status.as_str())
        .bind(&e.forma_pagamento)
        .bind(&e.numero_documento)
        .bind(&e.observacoes)
        .bind(&e.motivo_cancelamento)
        .bind(e.created_at)
        .bind(e.updated_at)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from_insert)?;

        Ok(())
    }

    async fn atualizar(&self, conta: &ContaReceber) -> RepositoryResult<()> {
        let e = conta.estado();
        let result = sqlx::query(
            r#"
            UPDATE contas_receber
            SET valor_recebido = $2,
                data_recebimento = $3,
                status = $4,
                forma_pagamento = $5,
                observacoes = $6,
                motivo_cancelamento = $7,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(e.id)
        .bind(e.valor_recebido)
        .bind(e.data_recebimento)
        .bind(e.status.as_str())
        .bind(&e.forma_pagamento)
        .bind(&e.observacoes)
        .bind(&e.motivo_cancelamento)
        .bind(e.updated_at)
        .execute(&self.pool)
        .await?;

        RepositoryError::check_updated(result.rows_affected(), "ContaReceber", e.id)
    }

    async fn buscar(&self, id: Uuid) -> RepositoryResult<Option<ContaReceber>> {
        let sql = format!("SELECT {} FROM contas_receber WHERE id = $1", CONTA_RECEBER_COLUMNS);
        let row: Option<ContaReceberRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ContaReceber::try_from).transpose()
    }

    async fn listar(
        &self,
        filtro: &FiltroContas<StatusContaReceber>,
    ) -> RepositoryResult<Vec<ContaReceber>> {
        let sql = format!(
            r#"
            SELECT {} FROM contas_receber
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR obra_id = $2)
            ORDER BY data_vencimento ASC
            LIMIT $3 OFFSET $4
            "#,
            CONTA_RECEBER_COLUMNS
        );
        let rows: Vec<ContaReceberRow> = sqlx::query_as(&sql)
            .bind(filtro.status.map(|s| s.as_str()))
            .bind(filtro.obra_id)
            .bind(filtro.limit)
            .bind(filtro.offset)
            .fetch_all(&self.pool)
            .await?;

        contas_receber(rows)
    }

    async fn listar_por_cronograma(
        &self,
        cronograma_recebimento_id: Uuid,
    ) -> RepositoryResult<Vec<ContaReceber>> {
        let sql = format!(
            r#"
            SELECT {} FROM contas_receber
            WHERE cronograma_recebimento_id = $1
            ORDER BY created_at ASC
            "#,
            CONTA_RECEBER_COLUMNS
        );
        let rows: Vec<ContaReceberRow> = sqlx::query_as(&sql)
            .bind(cronograma_recebimento_id)
            .fetch_all(&self.pool)
            .await?;

        contas_receber(rows)
    }

    async fn listar_pendentes_vencidas(
        &self,
        agora: DateTime<Utc>,
    ) -> RepositoryResult<Vec<ContaReceber>> {
        let sql = format!(
            r#"
            SELECT {} FROM contas_receber
            WHERE status = $1 AND data_vencimento < $2
            ORDER BY data_vencimento ASC
            "#,
            CONTA_RECEBER_COLUMNS
        );
        let rows: Vec<ContaReceberRow> = sqlx::query_as(&sql)
            .bind(StatusContaReceber::Pendente.as_str())
            .bind(agora)
            .fetch_all(&self.pool)
            .await?;

        contas_receber(rows)
    }
}

// =========================================================================
// Cronogramas de recebimento
// =========================================================================

const CRONOGRAMA_COLUMNS: &str = r#"
    id, obra_id, numero_etapa, descricao, valor_previsto, valor_recebido,
    data_vencimento, data_recebimento, status, created_at, updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct CronogramaRow {
    id: Uuid,
    obra_id: Uuid,
    numero_etapa: i32,
    descricao: String,
    valor_previsto: Decimal,
    valor_recebido: Decimal,
    data_vencimento: DateTime<Utc>,
    data_recebimento: Option<DateTime<Utc>>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CronogramaRow> for CronogramaRecebimento {
    type Error = RepositoryError;

    fn try_from(row: CronogramaRow) -> Result<Self, Self::Error> {
        Ok(CronogramaRecebimento::from_db_state(
            CronogramaRecebimentoEstado {
                id: row.id,
                obra_id: row.obra_id,
                numero_etapa: row.numero_etapa,
                descricao: row.descricao,
                valor_previsto: row.valor_previsto,
                valor_recebido: row.valor_recebido,
                data_vencimento: row.data_vencimento,
                data_recebimento: row.data_recebimento,
                status: row.status.parse()?,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        ))
    }
}

fn cronogramas(rows: Vec<CronogramaRow>) -> RepositoryResult<Vec<CronogramaRecebimento>> {
    rows.into_iter()
        .map(CronogramaRecebimento::try_from)
        .collect()
}

#[derive(Debug, Clone)]
pub struct PgCronogramaRepository {
    pool: PgPool,
}

impl PgCronogramaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CronogramaRepository for PgCronogramaRepository {
    async fn inserir_lote(&self, linhas: &[CronogramaRecebimento]) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        for linha in linhas {
            let e = linha.estado();
            sqlx::query(
                r#"
                INSERT INTO cronogramas_recebimento (
                    id, obra_id, numero_etapa, descricao, valor_previsto, valor_recebido,
                    data_vencimento, data_recebimento, status, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(e.id)
            .bind(e.obra_id)
            .bind(e.numero_etapa)
            .bind(&e.descricao)
            .bind(e.valor_previsto)
            .bind(e.valor_recebido)
            .bind(e.data_vencimento)
            .bind(e.data_recebimento)
            .bind(e.status.as_str())
            .bind(e.created_at)
            .bind(e.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn atualizar(&self, linha: &CronogramaRecebimento) -> RepositoryResult<()> {
        let e = linha.estado();
        let result = sqlx::query(
            r#"
            UPDATE cronogramas_recebimento
            SET valor_recebido = $2,
                data_recebimento = $3,
                status = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(e.id)
        .bind(e.valor_recebido)
        .bind(e.data_recebimento)
        .bind(e.status.as_str())
        .bind(e.updated_at)
        .execute(&self.pool)
        .await?;

        RepositoryError::check_updated(result.rows_affected(), "CronogramaRecebimento", e.id)
    }

    async fn buscar(&self, id: Uuid) -> RepositoryResult<Option<CronogramaRecebimento>> {
        let sql = format!(
            "SELECT {} FROM cronogramas_recebimento WHERE id = $1",
            CRONOGRAMA_COLUMNS
        );
        let row: Option<CronogramaRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CronogramaRecebimento::try_from).transpose()
    }

    async fn listar_por_obra(&self, obra_id: Uuid) -> RepositoryResult<Vec<CronogramaRecebimento>> {
        let sql = format!(
            r#"
            SELECT {} FROM cronogramas_recebimento
            WHERE obra_id = $1
            ORDER BY numero_etapa ASC
            "#,
            CRONOGRAMA_COLUMNS
        );
        let rows: Vec<CronogramaRow> = sqlx::query_as(&sql)
            .bind(obra_id)
            .fetch_all(&self.pool)
            .await?;

        cronogramas(rows)
    }

    async fn listar_pendentes_vencidos(
        &self,
        agora: DateTime<Utc>,
    ) -> RepositoryResult<Vec<CronogramaRecebimento>> {
        let sql = format!(
            r#"
            SELECT {} FROM cronogramas_recebimento
            WHERE status = 'PENDENTE' AND data_vencimento < $1
            ORDER BY data_vencimento ASC
            "#,
            CRONOGRAMA_COLUMNS
        );
        let rows: Vec<CronogramaRow> = sqlx::query_as(&sql)
            .bind(agora)
            .fetch_all(&self.pool)
            .await?;

        cronogramas(rows)
    }
}

// =========================================================================
// Collaborator records
// =========================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrcamentoRow {
    id: Uuid,
    obra_id: Option<Uuid>,
    etapa_id: Option<Uuid>,
    fornecedor_id: Option<Uuid>,
    fornecedor_nome: String,
    status: String,
    valor: Decimal,
    numero_documento: Option<String>,
    data_pagamento_prevista: Option<DateTime<Utc>>,
    excluido_em: Option<DateTime<Utc>>,
}

impl From<OrcamentoRow> for OrcamentoResumo {
    fn from(row: OrcamentoRow) -> Self {
        Self {
            id: row.id,
            obra_id: row.obra_id,
            etapa_id: row.etapa_id,
            fornecedor_id: row.fornecedor_id,
            fornecedor_nome: row.fornecedor_nome,
            status: row.status,
            valor: row.valor,
            numero_documento: row.numero_documento,
            data_pagamento_prevista: row.data_pagamento_prevista,
            excluido: row.excluido_em.is_some(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgOrcamentoRepository {
    pool: PgPool,
}

impl PgOrcamentoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrcamentoRepository for PgOrcamentoRepository {
    async fn buscar_resumo(&self, id: Uuid) -> RepositoryResult<Option<OrcamentoResumo>> {
        let row: Option<OrcamentoRow> = sqlx::query_as(
            r#"
            SELECT id, obra_id, etapa_id, fornecedor_id, fornecedor_nome, status, valor,
                   numero_documento, data_pagamento_prevista, excluido_em
            FROM orcamentos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(OrcamentoResumo::from))
    }

    async fn atualizar_status(&self, id: Uuid, status: &str) -> RepositoryResult<()> {
        sqlx::query("UPDATE orcamentos SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn marcar_excluido(&self, id: Uuid) -> RepositoryResult<()> {
        sqlx::query(
            "UPDATE orcamentos SET excluido_em = NOW(), updated_at = NOW() WHERE id = $1 AND excluido_em IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ApontamentoRow {
    id: Uuid,
    funcionario_id: Uuid,
    funcionario_nome: String,
    obra_id: Option<Uuid>,
    periodo_inicio: DateTime<Utc>,
    periodo_fim: DateTime<Utc>,
    valor_total: Decimal,
    status: String,
}

impl From<ApontamentoRow> for ApontamentoResumo {
    fn from(row: ApontamentoRow) -> Self {
        Self {
            id: row.id,
            funcionario_id: row.funcionario_id,
            funcionario_nome: row.funcionario_nome,
            obra_id: row.obra_id,
            periodo_inicio: row.periodo_inicio,
            periodo_fim: row.periodo_fim,
            valor_total: row.valor_total,
            status: row.status,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgApontamentoRepository {
    pool: PgPool,
}

impl PgApontamentoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApontamentoRepository for PgApontamentoRepository {
    async fn buscar_resumo(&self, id: Uuid) -> RepositoryResult<Option<ApontamentoResumo>> {
        let row: Option<ApontamentoRow> = sqlx::query_as(
            r#"
            SELECT id, funcionario_id, funcionario_nome, obra_id, periodo_inicio,
                   periodo_fim, valor_total, status
            FROM apontamentos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ApontamentoResumo::from))
    }

    async fn atualizar_status(&self, id: Uuid, status: &str) -> RepositoryResult<()> {
        sqlx::query("UPDATE apontamentos SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

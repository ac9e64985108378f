//! API Routes
//!
//! HTTP endpoint definitions. Handlers are thin: extract, call the service,
//! render the aggregate state.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{ContaPagarEstado, ContaReceberEstado, CronogramaRecebimentoEstado};
use crate::domain::{OperationContext, StatusContaPagar, StatusContaReceber};
use crate::error::AppError;
use crate::handlers::{
    AtualizarStatusOrcamentoCommand, CancelarContaCommand, CriarContaPagarCommand,
    CriarContaReceberCommand, CriarCronogramaCommand, PagarApontamentoCommand,
    RegistrarPagamentoCommand, RegistrarRecebimentoCronogramaCommand,
};
use crate::jobs::{self, MaintenanceReport};
use crate::repository::{ApontamentoResumo, FiltroContas, OrcamentoResumo, DEFAULT_LIMIT};
use crate::state::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

/// `?status=&obra_id=&limit=&offset=`
#[derive(Debug, Serialize, Deserialize)]
pub struct ListarContasQuery<S> {
    #[serde(default)]
    pub status: Option<S>,
    #[serde(default)]
    pub obra_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl<S> From<ListarContasQuery<S>> for FiltroContas<S> {
    fn from(query: ListarContasQuery<S>) -> Self {
        Self {
            status: query.status,
            obra_id: query.obra_id,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListaResponse<T> {
    pub itens: Vec<T>,
    pub total: usize,
}

impl<T> ListaResponse<T> {
    fn new(itens: Vec<T>) -> Self {
        Self {
            total: itens.len(),
            itens,
        }
    }
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Contas a pagar
        .route("/contas-pagar", post(criar_conta_pagar).get(listar_contas_pagar))
        .route("/contas-pagar/:id", get(buscar_conta_pagar))
        .route("/contas-pagar/:id/pagamentos", post(pagar_conta_pagar))
        .route("/contas-pagar/:id/cancelar", post(cancelar_conta_pagar))
        // Contas a receber
        .route(
            "/contas-receber",
            post(criar_conta_receber).get(listar_contas_receber),
        )
        .route("/contas-receber/:id", get(buscar_conta_receber))
        .route("/contas-receber/:id/recebimentos", post(receber_conta_receber))
        .route("/contas-receber/:id/cancelar", post(cancelar_conta_receber))
        // Cronogramas de recebimento
        .route("/cronogramas", post(criar_cronograma))
        .route("/cronogramas/:id", get(buscar_cronograma))
        .route("/cronogramas/:id/recebimentos", post(receber_cronograma))
        .route("/obras/:obra_id/cronogramas", get(listar_cronogramas_da_obra))
        // Collaborator contexts
        .route("/orcamentos/:id/status", patch(atualizar_status_orcamento))
        .route("/orcamentos/:id", delete(excluir_orcamento))
        .route("/apontamentos/:id/aprovar", post(aprovar_apontamento))
        .route("/apontamentos/:id/pagamento", post(pagar_apontamento))
        // Overdue sweep
        .route("/financeiro/vencimentos/processar", post(processar_vencimentos))
}

// =========================================================================
// Contas a pagar
// =========================================================================

async fn criar_conta_pagar(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(command): Json<CriarContaPagarCommand>,
) -> Result<(StatusCode, Json<ContaPagarEstado>), AppError> {
    let conta = state.contas_pagar.criar(command, &context).await?;
    Ok((StatusCode::CREATED, Json(conta.estado())))
}

async fn listar_contas_pagar(
    State(state): State<AppState>,
    Query(query): Query<ListarContasQuery<StatusContaPagar>>,
) -> Result<Json<ListaResponse<ContaPagarEstado>>, AppError> {
    let contas = state.contas_pagar.listar(query.into()).await?;
    Ok(Json(ListaResponse::new(
        contas.iter().map(|c| c.estado()).collect(),
    )))
}

async fn buscar_conta_pagar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContaPagarEstado>, AppError> {
    let conta = state.contas_pagar.buscar(id).await?;
    Ok(Json(conta.estado()))
}

async fn pagar_conta_pagar(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<Uuid>,
    Json(command): Json<RegistrarPagamentoCommand>,
) -> Result<Json<ContaPagarEstado>, AppError> {
    let conta = state
        .contas_pagar
        .registrar_pagamento(id, command, &context)
        .await?;
    Ok(Json(conta.estado()))
}

async fn cancelar_conta_pagar(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<Uuid>,
    command: Option<Json<CancelarContaCommand>>,
) -> Result<Json<ContaPagarEstado>, AppError> {
    let command = command.map(|Json(c)| c).unwrap_or_default();
    let conta = state.contas_pagar.cancelar(id, command, &context).await?;
    Ok(Json(conta.estado()))
}

// =========================================================================
// Contas a receber
// =========================================================================

async fn criar_conta_receber(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(command): Json<CriarContaReceberCommand>,
) -> Result<(StatusCode, Json<ContaReceberEstado>), AppError> {
    let conta = state.contas_receber.criar(command, &context).await?;
    Ok((StatusCode::CREATED, Json(conta.estado())))
}

async fn listar_contas_receber(
    State(state): State<AppState>,
    Query(query): Query<ListarContasQuery<StatusContaReceber>>,
) -> Result<Json<ListaResponse<ContaReceberEstado>>, AppError> {
    let contas = state.contas_receber.listar(query.into()).await?;
    Ok(Json(ListaResponse::new(
        contas.iter().map(|c| c.estado()).collect(),
    )))
}

async fn buscar_conta_receber(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContaReceberEstado>, AppError> {
    let conta = state.contas_receber.buscar(id).await?;
    Ok(Json(conta.estado()))
}

async fn receber_conta_receber(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<Uuid>,
    Json(command): Json<RegistrarPagamentoCommand>,
) -> Result<Json<ContaReceberEstado>, AppError> {
    let conta = state
        .contas_receber
        .registrar_recebimento(id, command, &context)
        .await?;
    Ok(Json(conta.estado()))
}

async fn cancelar_conta_receber(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<Uuid>,
    command: Option<Json<CancelarContaCommand>>,
) -> Result<Json<ContaReceberEstado>, AppError> {
    let command = command.map(|Json(c)| c).unwrap_or_default();
    let conta = state.contas_receber.cancelar(id, command, &context).await?;
    Ok(Json(conta.estado()))
}

// =========================================================================
// Cronogramas de recebimento
// =========================================================================

async fn criar_cronograma(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(command): Json<CriarCronogramaCommand>,
) -> Result<(StatusCode, Json<ListaResponse<CronogramaRecebimentoEstado>>), AppError> {
    let linhas = state.cronogramas.criar(command, &context).await?;
    Ok((
        StatusCode::CREATED,
        Json(ListaResponse::new(
            linhas.iter().map(|l| l.estado()).collect(),
        )),
    ))
}

async fn buscar_cronograma(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CronogramaRecebimentoEstado>, AppError> {
    let linha = state.cronogramas.buscar(id).await?;
    Ok(Json(linha.estado()))
}

async fn listar_cronogramas_da_obra(
    State(state): State<AppState>,
    Path(obra_id): Path<Uuid>,
) -> Result<Json<ListaResponse<CronogramaRecebimentoEstado>>, AppError> {
    let linhas = state.cronogramas.listar_por_obra(obra_id).await?;
    Ok(Json(ListaResponse::new(
        linhas.iter().map(|l| l.estado()).collect(),
    )))
}

async fn receber_cronograma(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<Uuid>,
    Json(command): Json<RegistrarRecebimentoCronogramaCommand>,
) -> Result<Json<CronogramaRecebimentoEstado>, AppError> {
    let linha = state
        .cronogramas
        .registrar_recebimento(id, command, &context)
        .await?;
    Ok(Json(linha.estado()))
}

// =========================================================================
// Orcamentos / Apontamentos
// =========================================================================

async fn atualizar_status_orcamento(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<Uuid>,
    Json(command): Json<AtualizarStatusOrcamentoCommand>,
) -> Result<Json<OrcamentoResumo>, AppError> {
    let orcamento = state
        .orcamentos
        .atualizar_status(id, command, &context)
        .await?;
    Ok(Json(orcamento))
}

async fn excluir_orcamento(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.orcamentos.excluir(id, &context).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn aprovar_apontamento(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApontamentoResumo>, AppError> {
    let apontamento = state.apontamentos.aprovar(id, &context).await?;
    Ok(Json(apontamento))
}

async fn pagar_apontamento(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<Uuid>,
    command: Option<Json<PagarApontamentoCommand>>,
) -> Result<Json<ApontamentoResumo>, AppError> {
    let command = command.map(|Json(c)| c).unwrap_or_default();
    let apontamento = state
        .apontamentos
        .registrar_pagamento(id, command, &context)
        .await?;
    Ok(Json(apontamento))
}

// =========================================================================
// Overdue sweep
// =========================================================================

async fn processar_vencimentos(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> Json<MaintenanceReport> {
    Json(jobs::processar_vencimentos(&state, Utc::now(), &context).await)
}

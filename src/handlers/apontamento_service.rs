//! Apontamento Service
//!
//! Payroll timesheet approval and payment. Both only flip the timesheet's
//! status and announce it; the payable side reacts to the events.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::bus::{Event, EventBus};
use crate::domain::events::{ApontamentoAprovado, PagamentoApontamentoRealizado};
use crate::domain::{topics, OperationContext};
use crate::error::{AppError, AppResult};
use crate::repository::{status_apontamento, ApontamentoRepository, ApontamentoResumo};

use super::PagarApontamentoCommand;

#[derive(Clone)]
pub struct ApontamentoService {
    repo: Arc<dyn ApontamentoRepository>,
    bus: EventBus,
}

impl ApontamentoService {
    pub fn new(repo: Arc<dyn ApontamentoRepository>, bus: EventBus) -> Self {
        Self { repo, bus }
    }

    pub async fn buscar_resumo(&self, id: Uuid) -> AppResult<ApontamentoResumo> {
        self.repo
            .buscar_resumo(id)
            .await?
            .ok_or_else(|| AppError::not_found("apontamento", id))
    }

    /// PENDENTE -> APROVADO
    pub async fn aprovar(
        &self,
        id: Uuid,
        context: &OperationContext,
    ) -> AppResult<ApontamentoResumo> {
        let mut apontamento = self.buscar_resumo(id).await?;
        exigir_status(&apontamento, status_apontamento::PENDENTE)?;

        self.repo
            .atualizar_status(id, status_apontamento::APROVADO)
            .await?;
        apontamento.status = status_apontamento::APROVADO.to_string();

        tracing::info!(
            apontamento_id = %id,
            funcionario_id = %apontamento.funcionario_id,
            valor_total = %apontamento.valor_total,
            "Timesheet approved"
        );

        self.bus.publish(
            context,
            Event::new(
                topics::APONTAMENTO_APROVADO,
                ApontamentoAprovado {
                    apontamento_id: apontamento.id,
                    funcionario_id: apontamento.funcionario_id,
                    funcionario_nome: apontamento.funcionario_nome.clone(),
                    obra_id: apontamento.obra_id,
                    periodo_inicio: apontamento.periodo_inicio,
                    periodo_fim: apontamento.periodo_fim,
                    valor_total: apontamento.valor_total,
                    usuario_id: context.usuario_id,
                },
            ),
        );

        Ok(apontamento)
    }

    /// APROVADO -> PAGO; pays the full timesheet value
    pub async fn registrar_pagamento(
        &self,
        id: Uuid,
        command: PagarApontamentoCommand,
        context: &OperationContext,
    ) -> AppResult<ApontamentoResumo> {
        let mut apontamento = self.buscar_resumo(id).await?;
        exigir_status(&apontamento, status_apontamento::APROVADO)?;

        self.repo
            .atualizar_status(id, status_apontamento::PAGO)
            .await?;
        apontamento.status = status_apontamento::PAGO.to_string();

        tracing::info!(apontamento_id = %id, "Timesheet paid");

        self.bus.publish(
            context,
            Event::new(
                topics::PAGAMENTO_APONTAMENTO_REALIZADO,
                PagamentoApontamentoRealizado {
                    apontamento_id: apontamento.id,
                    funcionario_id: apontamento.funcionario_id,
                    valor_pago: apontamento.valor_total,
                    data_pagamento: Utc::now(),
                    forma_pagamento: command.forma_pagamento,
                    usuario_id: context.usuario_id,
                },
            ),
        );

        Ok(apontamento)
    }
}

fn exigir_status(apontamento: &ApontamentoResumo, esperado: &str) -> AppResult<()> {
    if apontamento.status != esperado {
        return Err(AppError::InvalidRequest(format!(
            "apontamento {} is {}, expected {}",
            apontamento.id, apontamento.status, esperado
        )));
    }
    Ok(())
}

//! Orcamento Service
//!
//! The two budget operations the financial core cares about: status changes
//! (announced so an approval can derive a payable) and soft deletion (which
//! synchronously cancels the derived payable).

use std::sync::Arc;

use uuid::Uuid;

use crate::aggregate::TituloFinanceiro;
use crate::bus::{Event, EventBus};
use crate::domain::events::OrcamentoStatusAtualizado;
use crate::domain::{topics, DomainError, OperationContext};
use crate::error::{AppError, AppResult};
use crate::repository::{OrcamentoRepository, OrcamentoResumo};

use super::{AtualizarStatusOrcamentoCommand, ContaPagarService};

#[derive(Clone)]
pub struct OrcamentoService {
    repo: Arc<dyn OrcamentoRepository>,
    contas_pagar: ContaPagarService,
    bus: EventBus,
}

impl OrcamentoService {
    pub fn new(
        repo: Arc<dyn OrcamentoRepository>,
        contas_pagar: ContaPagarService,
        bus: EventBus,
    ) -> Self {
        Self {
            repo,
            contas_pagar,
            bus,
        }
    }

    /// Live (not deleted) budget
    pub async fn buscar_resumo(&self, id: Uuid) -> AppResult<OrcamentoResumo> {
        match self.repo.buscar_resumo(id).await? {
            Some(orcamento) if !orcamento.excluido => Ok(orcamento),
            _ => Err(AppError::not_found("orcamento", id)),
        }
    }

    /// Change the budget status and announce the change.
    ///
    /// Setting the status it already has is a no-op and publishes nothing.
    pub async fn atualizar_status(
        &self,
        id: Uuid,
        command: AtualizarStatusOrcamentoCommand,
        context: &OperationContext,
    ) -> AppResult<OrcamentoResumo> {
        let novo_status = command.novo_status.trim().to_string();
        if novo_status.is_empty() {
            return Err(DomainError::validation("novo_status is required").into());
        }

        let mut orcamento = self.buscar_resumo(id).await?;
        if orcamento.status == novo_status {
            return Ok(orcamento);
        }

        self.repo.atualizar_status(id, &novo_status).await?;
        let status_anterior = std::mem::replace(&mut orcamento.status, novo_status.clone());

        tracing::info!(
            orcamento_id = %id,
            status_anterior = %status_anterior,
            novo_status = %novo_status,
            "Budget status changed"
        );

        self.bus.publish(
            context,
            Event::new(
                topics::ORCAMENTO_STATUS_ATUALIZADO,
                OrcamentoStatusAtualizado {
                    orcamento_id: id,
                    etapa_id: orcamento.etapa_id,
                    status_anterior,
                    novo_status,
                    valor: orcamento.valor,
                },
            ),
        );

        Ok(orcamento)
    }

    /// Soft-delete a budget, cancelling its payable first.
    ///
    /// When the payable already received a payment the deletion is refused
    /// with `AlreadyPaid` and the budget stays as it was.
    pub async fn excluir(&self, id: Uuid, context: &OperationContext) -> AppResult<()> {
        self.buscar_resumo(id).await?;

        let cancelada = self
            .contas_pagar
            .cancelar_por_orcamento(id, Some("Orçamento excluído".to_string()), context)
            .await?;

        self.repo.marcar_excluido(id).await?;

        tracing::info!(
            orcamento_id = %id,
            conta_pagar_cancelada = ?cancelada.as_ref().map(|c| c.id()),
            "Budget deleted"
        );
        Ok(())
    }
}

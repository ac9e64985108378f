//! Cronograma Service
//!
//! Billing schedule use cases. Creating a schedule and receiving money
//! against a line are the two producers the receivables choreography
//! listens to.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::aggregate::{CronogramaRecebimento, TituloFinanceiro};
use crate::bus::{Event, EventBus};
use crate::domain::events::{RecebimentoCronogramaCriado, RecebimentoObraRealizado};
use crate::domain::{topics, Amount, DomainError, OperationContext};
use crate::error::{AppError, AppResult};
use crate::repository::CronogramaRepository;

use super::{CriarCronogramaCommand, RegistrarRecebimentoCronogramaCommand, ResultadoVencimento};

#[derive(Clone)]
pub struct CronogramaService {
    repo: Arc<dyn CronogramaRepository>,
    bus: EventBus,
}

impl CronogramaService {
    pub fn new(repo: Arc<dyn CronogramaRepository>, bus: EventBus) -> Self {
        Self { repo, bus }
    }

    /// Create the billing schedule of a project, one line per step, and
    /// announce it so receivables get derived.
    pub async fn criar(
        &self,
        command: CriarCronogramaCommand,
        context: &OperationContext,
    ) -> AppResult<Vec<CronogramaRecebimento>> {
        if command.etapas.is_empty() {
            return Err(DomainError::validation("etapas must not be empty").into());
        }
        if command.cliente.trim().is_empty() {
            return Err(DomainError::validation("cliente is required").into());
        }

        let mut linhas = Vec::with_capacity(command.etapas.len());
        for (indice, etapa) in command.etapas.into_iter().enumerate() {
            let numero_etapa = i32::try_from(indice + 1)
                .map_err(|_| AppError::InvalidRequest("too many etapas".to_string()))?;
            linhas.push(CronogramaRecebimento::criar(
                command.obra_id,
                numero_etapa,
                etapa.descricao,
                Amount::new(etapa.valor).map_err(DomainError::from)?,
                etapa.data_vencimento,
            )?);
        }

        self.repo.inserir_lote(&linhas).await?;

        let valor_total_previsto: Decimal = linhas.iter().map(|l| l.valor_previsto()).sum();
        let primeiro_vencimento = linhas
            .iter()
            .map(|l| l.data_vencimento())
            .min()
            .ok_or_else(|| AppError::Internal("schedule without lines".to_string()))?;
        let quantidade_etapas = u32::try_from(linhas.len())
            .map_err(|_| AppError::InvalidRequest("too many etapas".to_string()))?;

        tracing::info!(
            obra_id = %command.obra_id,
            etapas = linhas.len(),
            valor_total = %valor_total_previsto,
            "Billing schedule created"
        );

        self.bus.publish(
            context,
            Event::new(
                topics::CRONOGRAMA_RECEBIMENTO_CRIADO,
                RecebimentoCronogramaCriado {
                    obra_id: command.obra_id,
                    obra_nome: command.obra_nome,
                    cliente: command.cliente,
                    cronogramas_ids: linhas.iter().map(|l| l.id()).collect(),
                    valor_total_previsto,
                    quantidade_etapas,
                    primeiro_vencimento,
                },
            ),
        );

        Ok(linhas)
    }

    pub async fn buscar(&self, id: Uuid) -> AppResult<CronogramaRecebimento> {
        self.repo
            .buscar(id)
            .await?
            .ok_or_else(|| AppError::not_found("cronograma_recebimento", id))
    }

    pub async fn listar_por_obra(&self, obra_id: Uuid) -> AppResult<Vec<CronogramaRecebimento>> {
        Ok(self.repo.listar_por_obra(obra_id).await?)
    }

    /// Register money received against a line and announce it
    pub async fn registrar_recebimento(
        &self,
        id: Uuid,
        command: RegistrarRecebimentoCronogramaCommand,
        context: &OperationContext,
    ) -> AppResult<CronogramaRecebimento> {
        let mut linha = self.buscar(id).await?;
        linha.registrar_recebimento(command.valor)?;
        self.repo.atualizar(&linha).await?;

        tracing::info!(
            cronograma_recebimento_id = %linha.id(),
            valor = %command.valor,
            status = %linha.status(),
            "Schedule receipt registered"
        );

        self.bus.publish(
            context,
            Event::new(
                topics::OBRA_RECEBIMENTO_REALIZADO,
                RecebimentoObraRealizado {
                    cronograma_recebimento_id: Some(linha.id()),
                    obra_id: Some(linha.obra_id()),
                    cliente: command.cliente,
                    valor_recebido: command.valor,
                    data_recebimento: linha.data_recebimento().unwrap_or_else(Utc::now),
                    forma_pagamento: command.forma_pagamento,
                },
            ),
        );

        Ok(linha)
    }

    /// Move every PENDENTE line due before `agora` to VENCIDO
    pub async fn processar_vencidos(
        &self,
        agora: DateTime<Utc>,
        context: &OperationContext,
    ) -> AppResult<ResultadoVencimento> {
        let mut resultado = ResultadoVencimento::default();

        for mut linha in self.repo.listar_pendentes_vencidos(agora).await? {
            if !linha.marcar_vencido(agora) {
                continue;
            }
            if let Err(e) = self.repo.atualizar(&linha).await {
                tracing::error!(cronograma_recebimento_id = %linha.id(), error = %e, "Failed to mark schedule line overdue");
                resultado.falhas += 1;
                continue;
            }

            resultado.marcados += 1;
            self.bus.publish(
                context,
                Event::new(topics::CRONOGRAMA_RECEBIMENTO_VENCIDO, linha.evento_vencido()),
            );
        }

        Ok(resultado)
    }
}

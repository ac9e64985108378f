//! Conta a Receber Service
//!
//! Use cases of the Accounts Receivable context.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::aggregate::{ContaReceber, NovaContaReceber, TituloFinanceiro};
use crate::bus::{Event, EventBus};
use crate::domain::events::MovimentacaoRegistrada;
use crate::domain::{
    topics, Amount, DomainError, OperationContext, StatusContaReceber, TipoDocumento,
    TipoMovimentacao,
};
use crate::error::{AppError, AppResult};
use crate::repository::{ContaReceberRepository, FiltroContas, RepositoryError};

use super::{
    CancelarContaCommand, CriarContaReceberCommand, CriarContaReceberDeCronogramaInput,
    RegistrarPagamentoCommand, ResultadoVencimento,
};

#[derive(Clone)]
pub struct ContaReceberService {
    repo: Arc<dyn ContaReceberRepository>,
    bus: EventBus,
}

impl ContaReceberService {
    pub fn new(repo: Arc<dyn ContaReceberRepository>, bus: EventBus) -> Self {
        Self { repo, bus }
    }

    pub async fn criar(
        &self,
        command: CriarContaReceberCommand,
        context: &OperationContext,
    ) -> AppResult<ContaReceber> {
        let conta = ContaReceber::criar(NovaContaReceber {
            obra_id: command.obra_id,
            cronograma_recebimento_id: None,
            cliente: command.cliente,
            descricao: command.descricao,
            valor_original: Amount::new(command.valor).map_err(DomainError::from)?,
            data_vencimento: command.data_vencimento,
            numero_documento: command.numero_documento,
            observacoes: command.observacoes,
        })?;

        self.inserir(conta, context).await
    }

    /// Create the receivable of a billing schedule line.
    ///
    /// Retry-safe: a line that already has a non-cancelled receivable gets
    /// it back instead of a second one.
    pub async fn criar_de_cronograma(
        &self,
        input: CriarContaReceberDeCronogramaInput,
        context: &OperationContext,
    ) -> AppResult<ContaReceber> {
        if let Some(existente) = self.ativa_por_cronograma(input.cronograma_recebimento_id).await? {
            tracing::info!(
                cronograma_recebimento_id = %input.cronograma_recebimento_id,
                conta_receber_id = %existente.id(),
                "Schedule line already has a receivable, skipping"
            );
            return Ok(existente);
        }

        let conta = ContaReceber::criar(NovaContaReceber {
            obra_id: Some(input.obra_id),
            cronograma_recebimento_id: Some(input.cronograma_recebimento_id),
            cliente: input.cliente,
            descricao: input.descricao,
            valor_original: Amount::new(input.valor).map_err(DomainError::from)?,
            data_vencimento: input.data_vencimento,
            numero_documento: None,
            observacoes: None,
        })?;

        let linha = input.cronograma_recebimento_id;
        match self.inserir(conta, context).await {
            Err(AppError::Repository(RepositoryError::Conflict(motivo))) => {
                tracing::info!(
                    cronograma_recebimento_id = %linha,
                    %motivo,
                    "Receivable created by a concurrent delivery"
                );
                self.ativa_por_cronograma(linha)
                    .await?
                    .ok_or_else(|| AppError::Internal(motivo))
            }
            resultado => resultado,
        }
    }

    async fn inserir(
        &self,
        conta: ContaReceber,
        context: &OperationContext,
    ) -> AppResult<ContaReceber> {
        self.repo.inserir(&conta).await?;

        tracing::info!(
            conta_receber_id = %conta.id(),
            valor = %conta.valor_original(),
            cronograma_recebimento_id = ?conta.cronograma_recebimento_id(),
            "Conta a receber created"
        );

        self.publicar(
            context,
            topics::CONTA_RECEBER_CRIADA,
            conta.evento(context.usuario_id),
        );
        Ok(conta)
    }

    pub async fn buscar(&self, id: Uuid) -> AppResult<ContaReceber> {
        self.repo
            .buscar(id)
            .await?
            .ok_or_else(|| AppError::not_found("conta_receber", id))
    }

    pub async fn listar(
        &self,
        filtro: FiltroContas<StatusContaReceber>,
    ) -> AppResult<Vec<ContaReceber>> {
        Ok(self.repo.listar(&filtro.normalizado()).await?)
    }

    /// Non-cancelled receivable linked to a schedule line
    pub async fn ativa_por_cronograma(
        &self,
        cronograma_recebimento_id: Uuid,
    ) -> AppResult<Option<ContaReceber>> {
        let contas = self
            .repo
            .listar_por_cronograma(cronograma_recebimento_id)
            .await?;
        Ok(contas
            .into_iter()
            .find(|c| c.status() != StatusContaReceber::Cancelado))
    }

    pub async fn registrar_recebimento(
        &self,
        id: Uuid,
        command: RegistrarPagamentoCommand,
        context: &OperationContext,
    ) -> AppResult<ContaReceber> {
        let conta = self.buscar(id).await?;
        self.receber(conta, command, context).await
    }

    /// Register a receipt on the receivable linked to a schedule line
    pub async fn registrar_recebimento_de_cronograma(
        &self,
        cronograma_recebimento_id: Uuid,
        command: RegistrarPagamentoCommand,
        context: &OperationContext,
    ) -> AppResult<ContaReceber> {
        let conta = self
            .ativa_por_cronograma(cronograma_recebimento_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found("conta_receber for cronograma", cronograma_recebimento_id)
            })?;
        self.receber(conta, command, context).await
    }

    async fn receber(
        &self,
        mut conta: ContaReceber,
        command: RegistrarPagamentoCommand,
        context: &OperationContext,
    ) -> AppResult<ContaReceber> {
        conta.registrar_recebimento(
            command.valor,
            command.forma_pagamento.clone(),
            command.observacoes,
        )?;
        self.repo.atualizar(&conta).await?;

        tracing::info!(
            conta_receber_id = %conta.id(),
            valor = %command.valor,
            status = %conta.status(),
            "Receipt registered"
        );

        self.publicar(
            context,
            topics::MOVIMENTACAO_REGISTRADA,
            MovimentacaoRegistrada {
                tipo: TipoMovimentacao::Entrada,
                valor: command.valor,
                documento_id: conta.id(),
                documento_tipo: TipoDocumento::ContaReceber,
                obra_id: conta.obra_id(),
                descricao: conta.descricao().to_string(),
                forma_pagamento: command.forma_pagamento,
                data_movimentacao: conta.data_recebimento().unwrap_or_else(Utc::now),
                usuario_id: context.usuario_id,
            },
        );

        if conta.esta_quitado() {
            self.publicar(
                context,
                topics::CONTA_RECEBER_PAGA,
                conta.evento(context.usuario_id),
            );
        }

        Ok(conta)
    }

    pub async fn cancelar(
        &self,
        id: Uuid,
        command: CancelarContaCommand,
        context: &OperationContext,
    ) -> AppResult<ContaReceber> {
        let mut conta = self.buscar(id).await?;
        conta.cancelar(command.motivo)?;
        self.repo.atualizar(&conta).await?;

        tracing::info!(
            conta_receber_id = %conta.id(),
            usuario_id = ?context.usuario_id,
            "Conta a receber cancelled"
        );
        Ok(conta)
    }

    /// Move every PENDENTE receivable due before `agora` to VENCIDO
    pub async fn processar_vencidas(
        &self,
        agora: DateTime<Utc>,
        context: &OperationContext,
    ) -> AppResult<ResultadoVencimento> {
        let mut resultado = ResultadoVencimento::default();

        for mut conta in self.repo.listar_pendentes_vencidas(agora).await? {
            if !conta.marcar_vencido(agora) {
                continue;
            }
            if let Err(e) = self.repo.atualizar(&conta).await {
                tracing::error!(conta_receber_id = %conta.id(), error = %e, "Failed to mark receivable overdue");
                resultado.falhas += 1;
                continue;
            }

            resultado.marcados += 1;
            self.publicar(
                context,
                topics::CONTA_RECEBER_VENCIDA,
                conta.evento(context.usuario_id),
            );
        }

        if resultado.marcados > 0 {
            tracing::info!(marcadas = resultado.marcados, "Receivables marked overdue");
        }
        Ok(resultado)
    }

    fn publicar<T>(&self, context: &OperationContext, topic: &str, payload: T)
    where
        T: Send + Sync + 'static,
    {
        self.bus.publish(context, Event::new(topic, payload));
    }
}

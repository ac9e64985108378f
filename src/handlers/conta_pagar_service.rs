//! Conta a Pagar Service
//!
//! Use cases of the Accounts Payable context: manual creation, creation
//! derived from budgets and payroll, payment, cancellation and the overdue
//! sweep. Every state change is persisted before its event is published.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::aggregate::{ContaPagar, NovaContaPagar, TituloFinanceiro};
use crate::bus::{Event, EventBus};
use crate::domain::events::MovimentacaoRegistrada;
use crate::domain::{
    topics, Amount, CategoriaContaPagar, DomainError, OperationContext, StatusContaPagar,
    TipoDocumento, TipoMovimentacao,
};
use crate::error::{AppError, AppResult};
use crate::repository::{ContaPagarRepository, FiltroContas, RepositoryError};

use super::{
    CancelarContaCommand, CriarContaPagarCommand, CriarContaPagarDeApontamentoInput,
    CriarContaPagarDeOrcamentoInput, RegistrarPagamentoCommand, ResultadoVencimento,
};

#[derive(Clone)]
pub struct ContaPagarService {
    repo: Arc<dyn ContaPagarRepository>,
    bus: EventBus,
}

impl ContaPagarService {
    pub fn new(repo: Arc<dyn ContaPagarRepository>, bus: EventBus) -> Self {
        Self { repo, bus }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    pub async fn criar(
        &self,
        command: CriarContaPagarCommand,
        context: &OperationContext,
    ) -> AppResult<ContaPagar> {
        let conta = ContaPagar::criar(NovaContaPagar {
            fornecedor_id: command.fornecedor_id,
            obra_id: command.obra_id,
            orcamento_id: None,
            apontamento_id: None,
            fornecedor_nome: command.fornecedor_nome,
            categoria: command.categoria,
            descricao: command.descricao,
            valor_original: Amount::new(command.valor).map_err(DomainError::from)?,
            data_vencimento: command.data_vencimento,
            numero_documento: command.numero_documento,
            observacoes: command.observacoes,
        })?;

        self.inserir(conta, context).await
    }

    /// Create the payable of an approved budget.
    ///
    /// Retry-safe: when a non-cancelled payable already exists for the
    /// budget it is returned unchanged.
    pub async fn criar_de_orcamento(
        &self,
        input: CriarContaPagarDeOrcamentoInput,
        context: &OperationContext,
    ) -> AppResult<ContaPagar> {
        if let Some(existente) = self.ativa_por_orcamento(input.orcamento_id).await? {
            tracing::info!(
                orcamento_id = %input.orcamento_id,
                conta_pagar_id = %existente.id(),
                "Budget already has a payable, skipping"
            );
            return Ok(existente);
        }

        let descricao = match &input.numero_documento {
            Some(numero) => format!("Orçamento {} - {}", numero, input.fornecedor_nome),
            None => format!("Orçamento aprovado - {}", input.fornecedor_nome),
        };

        let conta = ContaPagar::criar(NovaContaPagar {
            fornecedor_id: input.fornecedor_id,
            obra_id: input.obra_id,
            orcamento_id: Some(input.orcamento_id),
            apontamento_id: None,
            fornecedor_nome: input.fornecedor_nome,
            categoria: CategoriaContaPagar::Fornecedor,
            descricao,
            valor_original: Amount::new(input.valor).map_err(DomainError::from)?,
            data_vencimento: input.data_vencimento,
            numero_documento: input.numero_documento,
            observacoes: None,
        })?;

        let orcamento_id = input.orcamento_id;
        match self.inserir(conta, context).await {
            Err(AppError::Repository(RepositoryError::Conflict(motivo))) => {
                tracing::info!(%orcamento_id, %motivo, "Payable created by a concurrent delivery");
                self.ativa_por_orcamento(orcamento_id)
                    .await?
                    .ok_or_else(|| AppError::Internal(motivo))
            }
            resultado => resultado,
        }
    }

    /// Create the payable of an approved payroll timesheet. Retry-safe.
    pub async fn criar_de_apontamento(
        &self,
        input: CriarContaPagarDeApontamentoInput,
        context: &OperationContext,
    ) -> AppResult<ContaPagar> {
        if let Some(existente) = self.ativa_por_apontamento(input.apontamento_id).await? {
            tracing::info!(
                apontamento_id = %input.apontamento_id,
                conta_pagar_id = %existente.id(),
                "Timesheet already has a payable, skipping"
            );
            return Ok(existente);
        }

        let descricao = format!(
            "Folha de pagamento {} a {} - {}",
            input.periodo_inicio.format("%d/%m/%Y"),
            input.periodo_fim.format("%d/%m/%Y"),
            input.funcionario_nome
        );

        let conta = ContaPagar::criar(NovaContaPagar {
            fornecedor_id: Some(input.funcionario_id),
            obra_id: input.obra_id,
            orcamento_id: None,
            apontamento_id: Some(input.apontamento_id),
            fornecedor_nome: input.funcionario_nome,
            categoria: CategoriaContaPagar::Servico,
            descricao,
            valor_original: Amount::new(input.valor).map_err(DomainError::from)?,
            data_vencimento: input.periodo_fim,
            numero_documento: None,
            observacoes: None,
        })?;

        let apontamento_id = input.apontamento_id;
        match self.inserir(conta, context).await {
            Err(AppError::Repository(RepositoryError::Conflict(motivo))) => {
                tracing::info!(%apontamento_id, %motivo, "Payable created by a concurrent delivery");
                self.ativa_por_apontamento(apontamento_id)
                    .await?
                    .ok_or_else(|| AppError::Internal(motivo))
            }
            resultado => resultado,
        }
    }

    async fn inserir(&self, conta: ContaPagar, context: &OperationContext) -> AppResult<ContaPagar> {
        self.repo.inserir(&conta).await?;

        tracing::info!(
            conta_pagar_id = %conta.id(),
            valor = %conta.valor_original(),
            orcamento_id = ?conta.orcamento_id(),
            apontamento_id = ?conta.apontamento_id(),
            "Conta a pagar created"
        );

        self.publicar(
            context,
            topics::CONTA_PAGAR_CRIADA,
            conta.evento(context.usuario_id),
        );
        Ok(conta)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn buscar(&self, id: Uuid) -> AppResult<ContaPagar> {
        self.repo
            .buscar(id)
            .await?
            .ok_or_else(|| AppError::not_found("conta_pagar", id))
    }

    pub async fn listar(
        &self,
        filtro: FiltroContas<StatusContaPagar>,
    ) -> AppResult<Vec<ContaPagar>> {
        Ok(self.repo.listar(&filtro.normalizado()).await?)
    }

    async fn ativa_por_orcamento(&self, orcamento_id: Uuid) -> AppResult<Option<ContaPagar>> {
        let contas = self.repo.listar_por_orcamento(orcamento_id).await?;
        Ok(contas
            .into_iter()
            .find(|c| c.status() != StatusContaPagar::Cancelado))
    }

    async fn ativa_por_apontamento(&self, apontamento_id: Uuid) -> AppResult<Option<ContaPagar>> {
        let contas = self.repo.listar_por_apontamento(apontamento_id).await?;
        Ok(contas
            .into_iter()
            .find(|c| c.status() != StatusContaPagar::Cancelado))
    }

    // =========================================================================
    // Payment
    // =========================================================================

    /// Register a payment and publish the resulting financial movement.
    pub async fn registrar_pagamento(
        &self,
        id: Uuid,
        command: RegistrarPagamentoCommand,
        context: &OperationContext,
    ) -> AppResult<ContaPagar> {
        let conta = self.buscar(id).await?;
        self.pagar(conta, command, context).await
    }

    /// Pay the payable derived from a payroll timesheet
    pub async fn registrar_pagamento_de_apontamento(
        &self,
        apontamento_id: Uuid,
        command: RegistrarPagamentoCommand,
        context: &OperationContext,
    ) -> AppResult<ContaPagar> {
        let conta = self
            .ativa_por_apontamento(apontamento_id)
            .await?
            .ok_or_else(|| AppError::not_found("conta_pagar for apontamento", apontamento_id))?;
        self.pagar(conta, command, context).await
    }

    async fn pagar(
        &self,
        mut conta: ContaPagar,
        command: RegistrarPagamentoCommand,
        context: &OperationContext,
    ) -> AppResult<ContaPagar> {
        conta.registrar_pagamento(
            command.valor,
            command.forma_pagamento.clone(),
            command.observacoes,
        )?;
        self.repo.atualizar(&conta).await?;

        tracing::info!(
            conta_pagar_id = %conta.id(),
            valor = %command.valor,
            status = %conta.status(),
            "Payment registered"
        );

        self.publicar(
            context,
            topics::MOVIMENTACAO_REGISTRADA,
            MovimentacaoRegistrada {
                tipo: TipoMovimentacao::Saida,
                valor: command.valor,
                documento_id: conta.id(),
                documento_tipo: TipoDocumento::ContaPagar,
                obra_id: conta.obra_id(),
                descricao: conta.descricao().to_string(),
                forma_pagamento: command.forma_pagamento,
                data_movimentacao: conta.data_pagamento().unwrap_or_else(Utc::now),
                usuario_id: context.usuario_id,
            },
        );

        if conta.esta_quitado() {
            self.publicar(
                context,
                topics::CONTA_PAGAR_PAGA,
                conta.evento(context.usuario_id),
            );
        }

        Ok(conta)
    }

    // =========================================================================
    // Cancellation
    // =========================================================================

    pub async fn cancelar(
        &self,
        id: Uuid,
        command: CancelarContaCommand,
        context: &OperationContext,
    ) -> AppResult<ContaPagar> {
        let conta = self.buscar(id).await?;
        self.cancelar_conta(conta, command.motivo, context).await
    }

    /// Cancel the payable of a budget being deleted.
    ///
    /// Returns `None` when the budget never produced a payable. Fails with
    /// `AlreadyPaid` when something was already paid against it.
    pub async fn cancelar_por_orcamento(
        &self,
        orcamento_id: Uuid,
        motivo: Option<String>,
        context: &OperationContext,
    ) -> AppResult<Option<ContaPagar>> {
        match self.ativa_por_orcamento(orcamento_id).await? {
            Some(conta) => self.cancelar_conta(conta, motivo, context).await.map(Some),
            None => Ok(None),
        }
    }

    async fn cancelar_conta(
        &self,
        mut conta: ContaPagar,
        motivo: Option<String>,
        context: &OperationContext,
    ) -> AppResult<ContaPagar> {
        conta.cancelar(motivo)?;
        self.repo.atualizar(&conta).await?;

        tracing::info!(conta_pagar_id = %conta.id(), "Conta a pagar cancelled");

        self.publicar(
            context,
            topics::CONTA_PAGAR_CANCELADA,
            conta.evento(context.usuario_id),
        );
        Ok(conta)
    }

    // =========================================================================
    // Overdue sweep
    // =========================================================================

    /// Move every PENDENTE payable due before `agora` to VENCIDO.
    ///
    /// A failure on one payable is logged and counted; the sweep continues.
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
                tracing::error!(conta_pagar_id = %conta.id(), error = %e, "Failed to mark payable overdue");
                resultado.falhas += 1;
                continue;
            }

            resultado.marcados += 1;
            self.publicar(
                context,
                topics::CONTA_PAGAR_VENCIDA,
                conta.evento(context.usuario_id),
            );
        }

        if resultado.marcados > 0 {
            tracing::info!(marcadas = resultado.marcados, "Payables marked overdue");
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

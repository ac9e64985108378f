//! Accounts Receivable reactions
//!
//! - schedule batch created -> one receivable per line
//! - money received on a schedule line -> receipt on its receivable

use crate::aggregate::TituloFinanceiro;
use crate::bus::Event;
use crate::domain::events::{RecebimentoCronogramaCriado, RecebimentoObraRealizado};
use crate::domain::{topics, Amount, DomainError, OperationContext};
use crate::error::{AppError, AppResult};
use crate::handlers::{
    ContaReceberService, CriarContaReceberDeCronogramaInput, CronogramaService,
    RegistrarPagamentoCommand,
};
use crate::state::AppState;

use super::payload;

pub(super) fn register(state: &AppState) {
    let contas_receber = state.contas_receber.clone();
    let cronogramas = state.cronogramas.clone();
    state.bus.subscribe(
        topics::CRONOGRAMA_RECEBIMENTO_CRIADO,
        move |ctx: OperationContext, event: Event| {
            let contas_receber = contas_receber.clone();
            let cronogramas = cronogramas.clone();
            async move { on_cronograma_criado(&contas_receber, &cronogramas, &ctx, &event).await }
        },
    );

    let contas_receber = state.contas_receber.clone();
    state.bus.subscribe(
        topics::OBRA_RECEBIMENTO_REALIZADO,
        move |ctx: OperationContext, event: Event| {
            let contas_receber = contas_receber.clone();
            async move { on_recebimento_realizado(&contas_receber, &ctx, &event).await }
        },
    );
}

/// Create one receivable per schedule line.
///
/// Every line gets the same share of the announced total regardless of its
/// own planned value. A failing line is logged and skipped.
async fn on_cronograma_criado(
    contas_receber: &ContaReceberService,
    cronogramas: &CronogramaService,
    ctx: &OperationContext,
    event: &Event,
) -> AppResult<()> {
    let evento = payload::<RecebimentoCronogramaCriado>(event)?;
    let quantidade = evento.cronogramas_ids.len();
    if quantidade == 0 {
        tracing::warn!(obra_id = %evento.obra_id, "Schedule created without lines");
        return Ok(());
    }

    let partes = u32::try_from(quantidade)
        .map_err(|_| AppError::InvalidRequest("too many schedule lines".to_string()))?;
    let valor = Amount::rounded(evento.valor_total_previsto)
        .and_then(|total| total.equal_share(partes))
        .map_err(DomainError::from)?
        .value();

    let mut criadas = 0usize;
    for (indice, cronograma_id) in evento.cronogramas_ids.iter().copied().enumerate() {
        let linha = match cronogramas.buscar(cronograma_id).await {
            Ok(linha) => Some(linha),
            Err(e) => {
                tracing::warn!(
                    cronograma_recebimento_id = %cronograma_id,
                    error = %e,
                    "Schedule line not loaded, using first due date"
                );
                None
            }
        };

        let (descricao, data_vencimento) = match &linha {
            Some(l) => (
                format!("{} - Etapa {}: {}", evento.obra_nome, l.numero_etapa(), l.descricao()),
                l.data_vencimento(),
            ),
            None => (
                format!("{} - Parcela {}/{}", evento.obra_nome, indice + 1, quantidade),
                evento.primeiro_vencimento,
            ),
        };

        let input = CriarContaReceberDeCronogramaInput {
            cronograma_recebimento_id: cronograma_id,
            obra_id: evento.obra_id,
            cliente: evento.cliente.clone(),
            descricao,
            valor,
            data_vencimento,
        };

        match contas_receber.criar_de_cronograma(input, ctx).await {
            Ok(_) => criadas += 1,
            Err(e) => {
                tracing::error!(
                    cronograma_recebimento_id = %cronograma_id,
                    error = %e,
                    "Failed to create receivable for schedule line"
                );
            }
        }
    }

    tracing::info!(
        obra_id = %evento.obra_id,
        linhas = quantidade,
        criadas,
        "Schedule reconciled with receivables"
    );
    Ok(())
}

async fn on_recebimento_realizado(
    contas_receber: &ContaReceberService,
    ctx: &OperationContext,
    event: &Event,
) -> AppResult<()> {
    let evento = payload::<RecebimentoObraRealizado>(event)?;

    let Some(cronograma_id) = evento.cronograma_recebimento_id else {
        tracing::warn!(
            obra_id = ?evento.obra_id,
            "Receipt without schedule line, nothing to reconcile"
        );
        return Ok(());
    };

    let mut command = RegistrarPagamentoCommand::new(evento.valor_recebido);
    command.forma_pagamento = evento.forma_pagamento.clone();

    match contas_receber
        .registrar_recebimento_de_cronograma(cronograma_id, command, ctx)
        .await
    {
        Ok(_) => Ok(()),
        Err(AppError::NotFound(what)) => {
            tracing::warn!(
                cronograma_recebimento_id = %cronograma_id,
                missing = %what,
                "No receivable for schedule line, receipt dropped"
            );
            Ok(())
        }
        Err(e) => Err(e),
    }
}

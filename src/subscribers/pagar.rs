//! Accounts Payable reactions
//!
//! - budget approved -> payable created
//! - timesheet approved -> payable created
//! - timesheet paid -> payment registered on its payable

use chrono::{DateTime, Duration, Utc};

use crate::bus::Event;
use crate::domain::events::{
    ApontamentoAprovado, OrcamentoStatusAtualizado, PagamentoApontamentoRealizado,
};
use crate::domain::{topics, OperationContext};
use crate::error::AppResult;
use crate::handlers::{
    ContaPagarService, CriarContaPagarDeApontamentoInput, CriarContaPagarDeOrcamentoInput,
    OrcamentoService, RegistrarPagamentoCommand,
};
use crate::repository::OrcamentoResumo;
use crate::state::AppState;

use super::{payload, SubscriberConfig};

pub(super) fn register(state: &AppState, config: SubscriberConfig) {
    let contas_pagar = state.contas_pagar.clone();
    let orcamentos = state.orcamentos.clone();
    state.bus.subscribe(
        topics::ORCAMENTO_STATUS_ATUALIZADO,
        move |ctx: OperationContext, event: Event| {
            let contas_pagar = contas_pagar.clone();
            let orcamentos = orcamentos.clone();
            async move {
                on_orcamento_status_atualizado(&contas_pagar, &orcamentos, config, &ctx, &event)
                    .await
            }
        },
    );

    let contas_pagar = state.contas_pagar.clone();
    state.bus.subscribe(
        topics::APONTAMENTO_APROVADO,
        move |ctx: OperationContext, event: Event| {
            let contas_pagar = contas_pagar.clone();
            async move { on_apontamento_aprovado(&contas_pagar, &ctx, &event).await }
        },
    );

    let contas_pagar = state.contas_pagar.clone();
    state.bus.subscribe(
        topics::PAGAMENTO_APONTAMENTO_REALIZADO,
        move |ctx: OperationContext, event: Event| {
            let contas_pagar = contas_pagar.clone();
            async move { on_pagamento_apontamento(&contas_pagar, &ctx, &event).await }
        },
    );
}

/// Due date of a payable derived from a budget.
///
/// The agreed payment date wins when the budget already carries both a
/// document number and that date; otherwise `agora + prazo_dias`.
pub fn vencimento_de_orcamento(
    orcamento: &OrcamentoResumo,
    agora: DateTime<Utc>,
    prazo_dias: i64,
) -> DateTime<Utc> {
    match (&orcamento.numero_documento, orcamento.data_pagamento_prevista) {
        (Some(_), Some(data)) => data,
        _ => agora + Duration::days(prazo_dias),
    }
}

async fn on_orcamento_status_atualizado(
    contas_pagar: &ContaPagarService,
    orcamentos: &OrcamentoService,
    config: SubscriberConfig,
    ctx: &OperationContext,
    event: &Event,
) -> AppResult<()> {
    let evento = payload::<OrcamentoStatusAtualizado>(event)?;
    if !evento.foi_aprovado() {
        tracing::debug!(
            orcamento_id = %evento.orcamento_id,
            novo_status = %evento.novo_status,
            "Budget status change ignored"
        );
        return Ok(());
    }

    let orcamento = orcamentos.buscar_resumo(evento.orcamento_id).await?;
    let data_vencimento =
        vencimento_de_orcamento(&orcamento, Utc::now(), config.prazo_padrao_conta_pagar_dias);

    let conta = contas_pagar
        .criar_de_orcamento(
            CriarContaPagarDeOrcamentoInput {
                orcamento_id: orcamento.id,
                fornecedor_id: orcamento.fornecedor_id,
                obra_id: orcamento.obra_id,
                fornecedor_nome: orcamento.fornecedor_nome,
                valor: evento.valor,
                data_vencimento,
                numero_documento: orcamento.numero_documento,
            },
            ctx,
        )
        .await?;

    tracing::debug!(
        orcamento_id = %evento.orcamento_id,
        conta_pagar_status = %conta.status(),
        "Approved budget reconciled with payable"
    );
    Ok(())
}

async fn on_apontamento_aprovado(
    contas_pagar: &ContaPagarService,
    ctx: &OperationContext,
    event: &Event,
) -> AppResult<()> {
    let evento = payload::<ApontamentoAprovado>(event)?;

    contas_pagar
        .criar_de_apontamento(
            CriarContaPagarDeApontamentoInput {
                apontamento_id: evento.apontamento_id,
                funcionario_id: evento.funcionario_id,
                funcionario_nome: evento.funcionario_nome.clone(),
                obra_id: evento.obra_id,
                valor: evento.valor_total,
                periodo_inicio: evento.periodo_inicio,
                periodo_fim: evento.periodo_fim,
            },
            ctx,
        )
        .await?;
    Ok(())
}

async fn on_pagamento_apontamento(
    contas_pagar: &ContaPagarService,
    ctx: &OperationContext,
    event: &Event,
) -> AppResult<()> {
    let evento = payload::<PagamentoApontamentoRealizado>(event)?;

    let mut command = RegistrarPagamentoCommand::new(evento.valor_pago)
        .with_observacoes(format!("Pagamento do apontamento {}", evento.apontamento_id));
    command.forma_pagamento = evento.forma_pagamento.clone();

    contas_pagar
        .registrar_pagamento_de_apontamento(evento.apontamento_id, command, ctx)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn orcamento(
        numero_documento: Option<&str>,
        data_pagamento_prevista: Option<DateTime<Utc>>,
    ) -> OrcamentoResumo {
        OrcamentoResumo {
            id: Uuid::new_v4(),
            obra_id: None,
            etapa_id: None,
            fornecedor_id: None,
            fornecedor_nome: "Madeireira Central".to_string(),
            status: "Aprovado".to_string(),
            valor: dec!(1500),
            numero_documento: numero_documento.map(str::to_string),
            data_pagamento_prevista,
            excluido: false,
        }
    }

    #[test]
    fn test_due_date_uses_agreed_date_with_document() {
        let agora = Utc::now();
        let acordada = agora + Duration::days(12);

        let vencimento = vencimento_de_orcamento(&orcamento(Some("NF-123"), Some(acordada)), agora, 30);
        assert_eq!(vencimento, acordada);
    }

    #[test]
    fn test_due_date_falls_back_to_default_term() {
        let agora = Utc::now();
        let acordada = agora + Duration::days(12);

        assert_eq!(
            vencimento_de_orcamento(&orcamento(None, Some(acordada)), agora, 30),
            agora + Duration::days(30)
        );
        assert_eq!(
            vencimento_de_orcamento(&orcamento(Some("NF-123"), None), agora, 45),
            agora + Duration::days(45)
        );
    }
}

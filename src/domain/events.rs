//! Domain Events
//!
//! Topic names and payload shapes exchanged over the event bus. Payloads are
//! immutable facts; each topic has exactly one payload type for the life of
//! the process. JSON keys are camelCase, matching the contract the other
//! back-office contexts already speak.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    CategoriaContaPagar, StatusContaPagar, StatusContaReceber, StatusCronograma, TipoDocumento,
    TipoMovimentacao,
};

/// Topic names. The string values are the wire contract.
pub mod topics {
    /// Budget status changed (Budgets/Supplies context)
    pub const ORCAMENTO_STATUS_ATUALIZADO: &str = "orcamento:status_atualizado";

    /// A billing schedule batch was created for a project
    pub const CRONOGRAMA_RECEBIMENTO_CRIADO: &str = "cronograma:recebimento_criado";

    /// A schedule line became overdue
    pub const CRONOGRAMA_RECEBIMENTO_VENCIDO: &str = "cronograma:recebimento_vencido";

    /// Money was received against a schedule line
    pub const OBRA_RECEBIMENTO_REALIZADO: &str = "obra:recebimento_realizado";

    pub const CONTA_RECEBER_CRIADA: &str = "financeiro:conta_receber_criada";
    pub const CONTA_RECEBER_PAGA: &str = "financeiro:conta_receber_paga";
    pub const CONTA_RECEBER_VENCIDA: &str = "financeiro:conta_receber_vencida";

    pub const CONTA_PAGAR_CRIADA: &str = "financeiro:conta_pagar_criada";
    pub const CONTA_PAGAR_PAGA: &str = "financeiro:conta_pagar_paga";
    pub const CONTA_PAGAR_VENCIDA: &str = "financeiro:conta_pagar_vencida";
    pub const CONTA_PAGAR_CANCELADA: &str = "financeiro:conta_pagar_cancelada";

    /// Any payment or receipt, for reporting consumers
    pub const MOVIMENTACAO_REGISTRADA: &str = "financeiro:movimentacao_registrada";

    /// Payroll timesheet approved (Pessoal context)
    pub const APONTAMENTO_APROVADO: &str = "pessoal:apontamento_aprovado";

    /// Payroll timesheet paid
    pub const PAGAMENTO_APONTAMENTO_REALIZADO: &str = "pessoal:pagamento_apontamento_realizado";
}

/// Status label that triggers payable creation
pub const STATUS_ORCAMENTO_APROVADO: &str = "Aprovado";

/// `orcamento:status_atualizado`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrcamentoStatusAtualizado {
    pub orcamento_id: Uuid,
    pub etapa_id: Option<Uuid>,
    pub status_anterior: String,
    pub novo_status: String,
    pub valor: Decimal,
}

impl OrcamentoStatusAtualizado {
    pub fn foi_aprovado(&self) -> bool {
        self.novo_status == STATUS_ORCAMENTO_APROVADO
    }
}

/// `cronograma:recebimento_criado`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecebimentoCronogramaCriado {
    pub obra_id: Uuid,
    pub obra_nome: String,
    pub cliente: String,
    pub cronogramas_ids: Vec<Uuid>,
    pub valor_total_previsto: Decimal,
    pub quantidade_etapas: u32,
    pub primeiro_vencimento: DateTime<Utc>,
}

/// `cronograma:recebimento_vencido`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecebimentoCronogramaVencido {
    pub cronograma_recebimento_id: Uuid,
    pub obra_id: Uuid,
    pub numero_etapa: i32,
    pub valor_previsto: Decimal,
    pub data_vencimento: DateTime<Utc>,
    pub status: StatusCronograma,
}

/// `obra:recebimento_realizado`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecebimentoObraRealizado {
    pub cronograma_recebimento_id: Option<Uuid>,
    pub obra_id: Option<Uuid>,
    pub cliente: String,
    pub valor_recebido: Decimal,
    pub data_recebimento: DateTime<Utc>,
    pub forma_pagamento: Option<String>,
}

/// Payload of `financeiro:conta_receber_*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContaReceberEvento {
    pub conta_receber_id: Uuid,
    pub obra_id: Option<Uuid>,
    pub cronograma_recebimento_id: Option<Uuid>,
    pub cliente: String,
    pub descricao: String,
    pub valor_original: Decimal,
    pub valor_recebido: Decimal,
    pub data_vencimento: DateTime<Utc>,
    pub data_recebimento: Option<DateTime<Utc>>,
    pub status: StatusContaReceber,
    pub usuario_id: Option<Uuid>,
}

/// Payload of `financeiro:conta_pagar_*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContaPagarEvento {
    pub conta_pagar_id: Uuid,
    pub fornecedor_id: Option<Uuid>,
    pub obra_id: Option<Uuid>,
    pub orcamento_id: Option<Uuid>,
    pub apontamento_id: Option<Uuid>,
    pub fornecedor_nome: String,
    pub categoria: CategoriaContaPagar,
    pub descricao: String,
    pub valor_original: Decimal,
    pub valor_pago: Decimal,
    pub data_vencimento: DateTime<Utc>,
    pub data_pagamento: Option<DateTime<Utc>>,
    pub status: StatusContaPagar,
    pub usuario_id: Option<Uuid>,
}

/// `financeiro:movimentacao_registrada`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovimentacaoRegistrada {
    pub tipo: TipoMovimentacao,
    pub valor: Decimal,
    pub documento_id: Uuid,
    pub documento_tipo: TipoDocumento,
    pub obra_id: Option<Uuid>,
    pub descricao: String,
    pub forma_pagamento: Option<String>,
    pub data_movimentacao: DateTime<Utc>,
    pub usuario_id: Option<Uuid>,
}

/// `pessoal:apontamento_aprovado`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApontamentoAprovado {
    pub apontamento_id: Uuid,
    pub funcionario_id: Uuid,
    pub funcionario_nome: String,
    pub obra_id: Option<Uuid>,
    pub periodo_inicio: DateTime<Utc>,
    pub periodo_fim: DateTime<Utc>,
    pub valor_total: Decimal,
    pub usuario_id: Option<Uuid>,
}

/// `pessoal:pagamento_apontamento_realizado`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagamentoApontamentoRealizado {
    pub apontamento_id: Uuid,
    pub funcionario_id: Uuid,
    pub valor_pago: Decimal,
    pub data_pagamento: DateTime<Utc>,
    pub forma_pagamento: Option<String>,
    pub usuario_id: Option<Uuid>,
}

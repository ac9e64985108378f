//! Command definitions
//!
//! Commands represent intentions to change the system state. API requests
//! deserialize straight into them; choreography reactions build the
//! `*Input` variants from event payloads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::CategoriaContaPagar;

// =========================================================================
// Contas a pagar
// =========================================================================

/// Command to create a conta a pagar by hand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriarContaPagarCommand {
    pub fornecedor_id: Option<Uuid>,
    pub obra_id: Option<Uuid>,
    pub fornecedor_nome: String,
    #[serde(default)]
    pub categoria: CategoriaContaPagar,
    pub descricao: String,
    pub valor: Decimal,
    pub data_vencimento: DateTime<Utc>,
    pub numero_documento: Option<String>,
    pub observacoes: Option<String>,
}

impl CriarContaPagarCommand {
    pub fn new(
        fornecedor_nome: String,
        descricao: String,
        valor: Decimal,
        data_vencimento: DateTime<Utc>,
    ) -> Self {
        Self {
            fornecedor_id: None,
            obra_id: None,
            fornecedor_nome,
            categoria: CategoriaContaPagar::default(),
            descricao,
            valor,
            data_vencimento,
            numero_documento: None,
            observacoes: None,
        }
    }

    pub fn with_obra(mut self, obra_id: Uuid) -> Self {
        self.obra_id = Some(obra_id);
        self
    }

    pub fn with_fornecedor(mut self, fornecedor_id: Uuid) -> Self {
        self.fornecedor_id = Some(fornecedor_id);
        self
    }

    pub fn with_categoria(mut self, categoria: CategoriaContaPagar) -> Self {
        self.categoria = categoria;
        self
    }
}

/// Payable derived from an approved budget
#[derive(Debug, Clone, PartialEq)]
pub struct CriarContaPagarDeOrcamentoInput {
    pub orcamento_id: Uuid,
    pub fornecedor_id: Option<Uuid>,
    pub obra_id: Option<Uuid>,
    pub fornecedor_nome: String,
    pub valor: Decimal,
    pub data_vencimento: DateTime<Utc>,
    pub numero_documento: Option<String>,
}

/// Payable derived from an approved payroll timesheet
#[derive(Debug, Clone, PartialEq)]
pub struct CriarContaPagarDeApontamentoInput {
    pub apontamento_id: Uuid,
    pub funcionario_id: Uuid,
    pub funcionario_nome: String,
    pub obra_id: Option<Uuid>,
    pub valor: Decimal,
    pub periodo_inicio: DateTime<Utc>,
    pub periodo_fim: DateTime<Utc>,
}

/// Command to register a payment (or a receipt, for contas a receber)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrarPagamentoCommand {
    pub valor: Decimal,
    pub forma_pagamento: Option<String>,
    pub observacoes: Option<String>,
}

impl RegistrarPagamentoCommand {
    pub fn new(valor: Decimal) -> Self {
        Self {
            valor,
            forma_pagamento: None,
            observacoes: None,
        }
    }

    pub fn with_forma_pagamento(mut self, forma_pagamento: impl Into<String>) -> Self {
        self.forma_pagamento = Some(forma_pagamento.into());
        self
    }

    pub fn with_observacoes(mut self, observacoes: impl Into<String>) -> Self {
        self.observacoes = Some(observacoes.into());
        self
    }
}

/// Command to cancel a conta
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelarContaCommand {
    pub motivo: Option<String>,
}

// =========================================================================
// Contas a receber
// =========================================================================

/// Command to create a conta a receber by hand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriarContaReceberCommand {
    pub obra_id: Option<Uuid>,
    pub cliente: String,
    pub descricao: String,
    pub valor: Decimal,
    pub data_vencimento: DateTime<Utc>,
    pub numero_documento: Option<String>,
    pub observacoes: Option<String>,
}

impl CriarContaReceberCommand {
    pub fn new(
        cliente: String,
        descricao: String,
        valor: Decimal,
        data_vencimento: DateTime<Utc>,
    ) -> Self {
        Self {
            obra_id: None,
            cliente,
            descricao,
            valor,
            data_vencimento,
            numero_documento: None,
            observacoes: None,
        }
    }

    pub fn with_obra(mut self, obra_id: Uuid) -> Self {
        self.obra_id = Some(obra_id);
        self
    }
}

/// Receivable derived from a billing schedule line
#[derive(Debug, Clone, PartialEq)]
pub struct CriarContaReceberDeCronogramaInput {
    pub cronograma_recebimento_id: Uuid,
    pub obra_id: Uuid,
    pub cliente: String,
    pub descricao: String,
    pub valor: Decimal,
    pub data_vencimento: DateTime<Utc>,
}

// =========================================================================
// Cronogramas de recebimento
// =========================================================================

/// One milestone of a new billing schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtapaCronograma {
    pub descricao: String,
    pub valor: Decimal,
    pub data_vencimento: DateTime<Utc>,
}

/// Command to create the billing schedule of a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriarCronogramaCommand {
    pub obra_id: Uuid,
    pub obra_nome: String,
    pub cliente: String,
    pub etapas: Vec<EtapaCronograma>,
}

/// Command to register money received against a schedule line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrarRecebimentoCronogramaCommand {
    pub valor: Decimal,
    pub cliente: String,
    pub forma_pagamento: Option<String>,
}

// =========================================================================
// Collaborator contexts
// =========================================================================

/// Command to move a budget to a new status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtualizarStatusOrcamentoCommand {
    pub novo_status: String,
}

/// Command to pay an approved payroll timesheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagarApontamentoCommand {
    pub forma_pagamento: Option<String>,
}

// =========================================================================
// Results
// =========================================================================

/// Outcome of one overdue sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultadoVencimento {
    /// Items moved to VENCIDO
    pub marcados: usize,
    /// Items that failed to persist
    pub falhas: usize,
}

/// Outcome of sweeping every money aggregate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultadoVencimentos {
    pub contas_pagar: ResultadoVencimento,
    pub contas_receber: ResultadoVencimento,
    pub cronogramas: ResultadoVencimento,
}

impl ResultadoVencimentos {
    pub fn total_marcados(&self) -> usize {
        self.contas_pagar.marcados + self.contas_receber.marcados + self.cronogramas.marcados
    }

    pub fn total_falhas(&self) -> usize {
        self.contas_pagar.falhas + self.contas_receber.falhas + self.cronogramas.falhas
    }
}

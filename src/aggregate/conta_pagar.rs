//! Conta a Pagar Aggregate
//!
//! Money owed to a supplier, a service provider or an employee.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::ContaPagarEvento;
use crate::domain::{Amount, CategoriaContaPagar, DomainError, StatusContaPagar};

use super::{liquidar, texto_obrigatorio, TituloFinanceiro};

/// Input for a new conta a pagar
#[derive(Debug, Clone)]
pub struct NovaContaPagar {
    pub fornecedor_id: Option<Uuid>,
    pub obra_id: Option<Uuid>,
    pub orcamento_id: Option<Uuid>,
    pub apontamento_id: Option<Uuid>,
    pub fornecedor_nome: String,
    pub categoria: CategoriaContaPagar,
    pub descricao: String,
    pub valor_original: Amount,
    pub data_vencimento: DateTime<Utc>,
    pub numero_documento: Option<String>,
    pub observacoes: Option<String>,
}

/// Persisted state of a conta a pagar, as the storage layer sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContaPagarEstado {
    pub id: Uuid,
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
    pub forma_pagamento: Option<String>,
    pub numero_documento: Option<String>,
    pub observacoes: Option<String>,
    pub motivo_cancelamento: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Conta a Pagar Aggregate
///
/// # Invariants
/// - `valor_pago <= valor_original`
/// - PAGO and CANCELADO accept no further mutation
/// - cancellation only while nothing has been paid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContaPagar {
    id: Uuid,
    fornecedor_id: Option<Uuid>,
    obra_id: Option<Uuid>,
    orcamento_id: Option<Uuid>,
    apontamento_id: Option<Uuid>,
    fornecedor_nome: String,
    categoria: CategoriaContaPagar,
    descricao: String,
    valor_original: Decimal,
    valor_pago: Decimal,
    data_vencimento: DateTime<Utc>,
    data_pagamento: Option<DateTime<Utc>>,
    status: StatusContaPagar,
    forma_pagamento: Option<String>,
    numero_documento: Option<String>,
    observacoes: Option<String>,
    motivo_cancelamento: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContaPagar {
    /// Create a new PENDENTE conta a pagar
    pub fn criar(nova: NovaContaPagar) -> Result<Self, DomainError> {
        let fornecedor_nome = texto_obrigatorio("fornecedor_nome", nova.fornecedor_nome)?;
        let descricao = texto_obrigatorio("descricao", nova.descricao)?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            fornecedor_id: nova.fornecedor_id,
            obra_id: nova.obra_id,
            orcamento_id: nova.orcamento_id,
            apontamento_id: nova.apontamento_id,
            fornecedor_nome,
            categoria: nova.categoria,
            descricao,
            valor_original: nova.valor_original.value(),
            valor_pago: Decimal::ZERO,
            data_vencimento: nova.data_vencimento,
            data_pagamento: None,
            status: StatusContaPagar::Pendente,
            forma_pagamento: None,
            numero_documento: nova.numero_documento,
            observacoes: nova.observacoes,
            motivo_cancelamento: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild from storage
    pub fn from_db_state(estado: ContaPagarEstado) -> Self {
        Self {
            id: estado.id,
            fornecedor_id: estado.fornecedor_id,
            obra_id: estado.obra_id,
            orcamento_id: estado.orcamento_id,
            apontamento_id: estado.apontamento_id,
            fornecedor_nome: estado.fornecedor_nome,
            categoria: estado.categoria,
            descricao: estado.descricao,
            valor_original: estado.valor_original,
            valor_pago: estado.valor_pago,
            data_vencimento: estado.data_vencimento,
            data_pagamento: estado.data_pagamento,
            status: estado.status,
            forma_pagamento: estado.forma_pagamento,
            numero_documento: estado.numero_documento,
            observacoes: estado.observacoes,
            motivo_cancelamento: estado.motivo_cancelamento,
            created_at: estado.created_at,
            updated_at: estado.updated_at,
        }
    }

    /// Snapshot for storage
    pub fn estado(&self) -> ContaPagarEstado {
        ContaPagarEstado {
            id: self.id,
            fornecedor_id: self.fornecedor_id,
            obra_id: self.obra_id,
            orcamento_id: self.orcamento_id,
            apontamento_id: self.apontamento_id,
            fornecedor_nome: self.fornecedor_nome.clone(),
            categoria: self.categoria,
            descricao: self.descricao.clone(),
            valor_original: self.valor_original,
            valor_pago: self.valor_pago,
            data_vencimento: self.data_vencimento,
            data_pagamento: self.data_pagamento,
            status: self.status,
            forma_pagamento: self.forma_pagamento.clone(),
            numero_documento: self.numero_documento.clone(),
            observacoes: self.observacoes.clone(),
            motivo_cancelamento: self.motivo_cancelamento.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Register a (partial) payment.
    ///
    /// Not idempotent: the same call twice pays twice. State is unchanged on
    /// error.
    pub fn registrar_pagamento(
        &mut self,
        valor: Decimal,
        forma_pagamento: Option<String>,
        observacoes: Option<String>,
    ) -> Result<(), DomainError> {
        match self.status {
            StatusContaPagar::Pago => return Err(DomainError::AlreadySettled),
            StatusContaPagar::Cancelado => return Err(DomainError::AlreadyCancelled),
            _ => {}
        }

        let valor_pago = liquidar(self.valor_original, self.valor_pago, valor)?;
        let now = Utc::now();

        self.valor_pago = valor_pago;
        self.data_pagamento = Some(now);
        self.updated_at = now;
        if forma_pagamento.is_some() {
            self.forma_pagamento = forma_pagamento;
        }
        if observacoes.is_some() {
            self.observacoes = observacoes;
        }
        self.status = if self.valor_pago >= self.valor_original {
            StatusContaPagar::Pago
        } else {
            StatusContaPagar::Parcial
        };

        Ok(())
    }

    /// PENDENTE and past due becomes VENCIDO; anything else is left alone.
    ///
    /// Returns whether the status changed.
    pub fn marcar_vencido(&mut self, agora: DateTime<Utc>) -> bool {
        if self.status != StatusContaPagar::Pendente || agora <= self.data_vencimento {
            return false;
        }

        self.status = StatusContaPagar::Vencido;
        self.updated_at = agora;
        true
    }

    /// Soft-cancel
    pub fn cancelar(&mut self, motivo: Option<String>) -> Result<(), DomainError> {
        match self.status {
            StatusContaPagar::Pago => return Err(DomainError::AlreadySettled),
            StatusContaPagar::Cancelado => return Err(DomainError::AlreadyCancelled),
            _ => {}
        }
        if self.valor_pago > Decimal::ZERO {
            return Err(DomainError::AlreadyPaid {
                valor_pago: self.valor_pago,
            });
        }

        self.status = StatusContaPagar::Cancelado;
        self.motivo_cancelamento = motivo;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Event payload describing the current state
    pub fn evento(&self, usuario_id: Option<Uuid>) -> ContaPagarEvento {
        ContaPagarEvento {
            conta_pagar_id: self.id,
            fornecedor_id: self.fornecedor_id,
            obra_id: self.obra_id,
            orcamento_id: self.orcamento_id,
            apontamento_id: self.apontamento_id,
            fornecedor_nome: self.fornecedor_nome.clone(),
            categoria: self.categoria,
            descricao: self.descricao.clone(),
            valor_original: self.valor_original,
            valor_pago: self.valor_pago,
            data_vencimento: self.data_vencimento,
            data_pagamento: self.data_pagamento,
            status: self.status,
            usuario_id,
        }
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn fornecedor_id(&self) -> Option<Uuid> {
        self.fornecedor_id
    }

    pub fn obra_id(&self) -> Option<Uuid> {
        self.obra_id
    }

    pub fn orcamento_id(&self) -> Option<Uuid> {
        self.orcamento_id
    }

    pub fn apontamento_id(&self) -> Option<Uuid> {
        self.apontamento_id
    }

    pub fn fornecedor_nome(&self) -> &str {
        &self.fornecedor_nome
    }

    pub fn categoria(&self) -> CategoriaContaPagar {
        self.categoria
    }

    pub fn descricao(&self) -> &str {
        &self.descricao
    }

    pub fn valor_pago(&self) -> Decimal {
        self.valor_pago
    }

    pub fn data_pagamento(&self) -> Option<DateTime<Utc>> {
        self.data_pagamento
    }

    pub fn status(&self) -> StatusContaPagar {
        self.status
    }

    pub fn forma_pagamento(&self) -> Option<&str> {
        self.forma_pagamento.as_deref()
    }

    pub fn numero_documento(&self) -> Option<&str> {
        self.numero_documento.as_deref()
    }

    pub fn observacoes(&self) -> Option<&str> {
        self.observacoes.as_deref()
    }

    pub fn motivo_cancelamento(&self) -> Option<&str> {
        self.motivo_cancelamento.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl TituloFinanceiro for ContaPagar {
    fn id(&self) -> Uuid {
        self.id
    }

    fn valor_original(&self) -> Decimal {
        self.valor_original
    }

    fn valor_liquidado(&self) -> Decimal {
        self.valor_pago
    }

    fn data_vencimento(&self) -> DateTime<Utc> {
        self.data_vencimento
    }

    fn esta_quitado(&self) -> bool {
        self.status == StatusContaPagar::Pago
    }

    fn esta_encerrado(&self) -> bool {
        matches!(
            self.status,
            StatusContaPagar::Pago | StatusContaPagar::Cancelado
        )
    }
}

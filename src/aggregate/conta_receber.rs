//! Conta a Receber Aggregate
//!
//! Money owed by a client. Mirrors [`ContaPagar`](super::ContaPagar) with
//! receipts instead of payments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::ContaReceberEvento;
use crate::domain::{Amount, DomainError, StatusContaReceber};

use super::{liquidar, texto_obrigatorio, TituloFinanceiro};

/// Input for a new conta a receber
#[derive(Debug, Clone)]
pub struct NovaContaReceber {
    pub obra_id: Option<Uuid>,
    pub cronograma_recebimento_id: Option<Uuid>,
    pub cliente: String,
    pub descricao: String,
    pub valor_original: Amount,
    pub data_vencimento: DateTime<Utc>,
    pub numero_documento: Option<String>,
    pub observacoes: Option<String>,
}

/// Persisted state of a conta a receber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContaReceberEstado {
    pub id: Uuid,
    pub obra_id: Option<Uuid>,
    pub cronograma_recebimento_id: Option<Uuid>,
    pub cliente: String,
    pub descricao: String,
    pub valor_original: Decimal,
    pub valor_recebido: Decimal,
    pub data_vencimento: DateTime<Utc>,
    pub data_recebimento: Option<DateTime<Utc>>,
    pub status: StatusContaReceber,
    pub forma_pagamento: Option<String>,
    pub numero_documento: Option<String>,
    pub observacoes: Option<String>,
    pub motivo_cancelamento: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Conta a Receber Aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContaReceber {
    id: Uuid,
    obra_id: Option<Uuid>,
    cronograma_recebimento_id: Option<Uuid>,
    cliente: String,
    descricao: String,
    valor_original: Decimal,
    valor_recebido: Decimal,
    data_vencimento: DateTime<Utc>,
    data_recebimento: Option<DateTime<Utc>>,
    status: StatusContaReceber,
    forma_pagamento: Option<String>,
    numero_documento: Option<String>,
    observacoes: Option<String>,
    motivo_cancelamento: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContaReceber {
    pub fn criar(nova: NovaContaReceber) -> Result<Self, DomainError> {
        let cliente = texto_obrigatorio("cliente", nova.cliente)?;
        let descricao = texto_obrigatorio("descricao", nova.descricao)?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            obra_id: nova.obra_id,
            cronograma_recebimento_id: nova.cronograma_recebimento_id,
            cliente,
            descricao,
            valor_original: nova.valor_original.value(),
            valor_recebido: Decimal::ZERO,
            data_vencimento: nova.data_vencimento,
            data_recebimento: None,
            status: StatusContaReceber::Pendente,
            forma_pagamento: None,
            numero_documento: nova.numero_documento,
            observacoes: nova.observacoes,
            motivo_cancelamento: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn from_db_state(estado: ContaReceberEstado) -> Self {
        Self {
            id: estado.id,
            obra_id: estado.obra_id,
            cronograma_recebimento_id: estado.cronograma_recebimento_id,
            cliente: estado.cliente,
            descricao: estado.descricao,
            valor_original: estado.valor_original,
            valor_recebido: estado.valor_recebido,
            data_vencimento: estado.data_vencimento,
            data_recebimento: estado.data_recebimento,
            status: estado.status,
            forma_pagamento: estado.forma_pagamento,
            numero_documento: estado.numero_documento,
            observacoes: estado.observacoes,
            motivo_cancelamento: estado.motivo_cancelamento,
            created_at: estado.created_at,
            updated_at: estado.updated_at,
        }
    }

    pub fn estado(&self) -> ContaReceberEstado {
        ContaReceberEstado {
            id: self.id,
            obra_id: self.obra_id,
            cronograma_recebimento_id: self.cronograma_recebimento_id,
            cliente: self.cliente.clone(),
            descricao: self.descricao.clone(),
            valor_original: self.valor_original,
            valor_recebido: self.valor_recebido,
            data_vencimento: self.data_vencimento,
            data_recebimento: self.data_recebimento,
            status: self.status,
            forma_pagamento: self.forma_pagamento.clone(),
            numero_documento: self.numero_documento.clone(),
            observacoes: self.observacoes.clone(),
            motivo_cancelamento: self.motivo_cancelamento.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Register a (partial) receipt. Not idempotent; unchanged on error.
    pub fn registrar_recebimento(
        &mut self,
        valor: Decimal,
        forma_pagamento: Option<String>,
        observacoes: Option<String>,
    ) -> Result<(), DomainError> {
        match self.status {
            StatusContaReceber::Recebido => return Err(DomainError::AlreadySettled),
            StatusContaReceber::Cancelado => return Err(DomainError::AlreadyCancelled),
            _ => {}
        }

        let valor_recebido = liquidar(self.valor_original, self.valor_recebido, valor)?;
        let now = Utc::now();

        self.valor_recebido = valor_recebido;
        self.data_recebimento = Some(now);
        self.updated_at = now;
        if forma_pagamento.is_some() {
            self.forma_pagamento = forma_pagamento;
        }
        if observacoes.is_some() {
            self.observacoes = observacoes;
        }
        self.status = if self.valor_recebido >= self.valor_original {
            StatusContaReceber::Recebido
        } else {
            StatusContaReceber::Parcial
        };

        Ok(())
    }

    /// PENDENTE and past due becomes VENCIDO. Returns whether it changed.
    pub fn marcar_vencido(&mut self, agora: DateTime<Utc>) -> bool {
        if self.status != StatusContaReceber::Pendente || agora <= self.data_vencimento {
            return false;
        }

        self.status = StatusContaReceber::Vencido;
        self.updated_at = agora;
        true
    }

    pub fn cancelar(&mut self, motivo: Option<String>) -> Result<(), DomainError> {
        match self.status {
            StatusContaReceber::Recebido => return Err(DomainError::AlreadySettled),
            StatusContaReceber::Cancelado => return Err(DomainError::AlreadyCancelled),
            _ => {}
        }
        if self.valor_recebido > Decimal::ZERO {
            return Err(DomainError::AlreadyPaid {
                valor_pago: self.valor_recebido,
            });
        }

        self.status = StatusContaReceber::Cancelado;
        self.motivo_cancelamento = motivo;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn evento(&self, usuario_id: Option<Uuid>) -> ContaReceberEvento {
        ContaReceberEvento {
            conta_receber_id: self.id,
            obra_id: self.obra_id,
            cronograma_recebimento_id: self.cronograma_recebimento_id,
            cliente: self.cliente.clone(),
            descricao: self.descricao.clone(),
            valor_original: self.valor_original,
            valor_recebido: self.valor_recebido,
            data_vencimento: self.data_vencimento,
            data_recebimento: self.data_recebimento,
            status: self.status,
            usuario_id,
        }
    }

    pub fn obra_id(&self) -> Option<Uuid> {
        self.obra_id
    }

    pub fn cronograma_recebimento_id(&self) -> Option<Uuid> {
        self.cronograma_recebimento_id
    }

    pub fn cliente(&self) -> &str {
        &self.cliente
    }

    pub fn descricao(&self) -> &str {
        &self.descricao
    }

    pub fn valor_recebido(&self) -> Decimal {
        self.valor_recebido
    }

    pub fn data_recebimento(&self) -> Option<DateTime<Utc>> {
        self.data_recebimento
    }

    pub fn status(&self) -> StatusContaReceber {
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

impl TituloFinanceiro for ContaReceber {
    fn id(&self) -> Uuid {
        self.id
    }

    fn valor_original(&self) -> Decimal {
        self.valor_original
    }

    fn valor_liquidado(&self) -> Decimal {
        self.valor_recebido
    }

    fn data_vencimento(&self) -> DateTime<Utc> {
        self.data_vencimento
    }

    fn esta_quitado(&self) -> bool {
        self.status == StatusContaReceber::Recebido
    }

    fn esta_encerrado(&self) -> bool {
        matches!(
            self.status,
            StatusContaReceber::Recebido | StatusContaReceber::Cancelado
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn conta(valor: Decimal, vencimento: DateTime<Utc>) -> ContaReceber {
        ContaReceber::criar(NovaContaReceber {
            obra_id: Some(Uuid::new_v4()),
            cronograma_recebimento_id: Some(Uuid::new_v4()),
            cliente: "Incorporadora Horizonte".to_string(),
            descricao: "Parcela 1/3".to_string(),
            valor_original: Amount::new(valor).unwrap(),
            data_vencimento: vencimento,
            numero_documento: None,
            observacoes: None,
        })
        .unwrap()
    }

    #[test]
    fn test_receipts_reach_recebido() {
        let mut conta = conta(dec!(3000), Utc::now() + Duration::days(10));

        conta.registrar_recebimento(dec!(1000), None, None).unwrap();
        assert_eq!(conta.status(), StatusContaReceber::Parcial);

        conta
            .registrar_recebimento(dec!(2000), Some("TED".to_string()), None)
            .unwrap();
        assert_eq!(conta.status(), StatusContaReceber::Recebido);
        assert_eq!(conta.valor_recebido(), dec!(3000));
        assert_eq!(conta.forma_pagamento(), Some("TED"));
    }

    #[test]
    fn test_no_over_receipt() {
        let mut conta = conta(dec!(3000), Utc::now());
        conta.registrar_recebimento(dec!(2999.99), None, None).unwrap();
        let before = conta.clone();

        assert!(matches!(
            conta.registrar_recebimento(dec!(0.02), None, None),
            Err(DomainError::Overpayment { .. })
        ));
        assert_eq!(conta, before);
        assert!(conta.valor_recebido() <= dec!(3000));
    }

    #[test]
    fn test_received_rejects_further_receipts() {
        let mut conta = conta(dec!(10), Utc::now());
        conta.registrar_recebimento(dec!(10), None, None).unwrap();

        assert_eq!(
            conta.registrar_recebimento(dec!(1), None, None),
            Err(DomainError::AlreadySettled)
        );
        assert_eq!(conta.cancelar(None), Err(DomainError::AlreadySettled));
    }

    #[test]
    fn test_overdue_sweep_transition() {
        let mut conta = conta(dec!(10), Utc::now() - Duration::hours(1));

        assert!(conta.marcar_vencido(Utc::now()));
        assert!(!conta.marcar_vencido(Utc::now()));
        assert_eq!(conta.status(), StatusContaReceber::Vencido);
        assert!(conta.dias_em_atraso(Utc::now()) >= 0);
    }

    #[test]
    fn test_cancel_guard() {
        let mut paga = conta(dec!(500), Utc::now());
        paga.registrar_recebimento(dec!(100), None, None).unwrap();
        assert!(matches!(
            paga.cancelar(None),
            Err(DomainError::AlreadyPaid { .. })
        ));

        let mut aberta = conta(dec!(500), Utc::now());
        aberta.cancelar(Some("Contrato rescindido".to_string())).unwrap();
        assert_eq!(aberta.status(), StatusContaReceber::Cancelado);
        assert_eq!(
            aberta.registrar_recebimento(dec!(1), None, None),
            Err(DomainError::AlreadyCancelled)
        );
    }

    #[test]
    fn test_event_payload_links_schedule_line() {
        let conta = conta(dec!(3000), Utc::now());
        let evento = conta.evento(None);

        assert_eq!(evento.conta_receber_id, conta.id());
        assert_eq!(evento.cronograma_recebimento_id, conta.cronograma_recebimento_id());
        assert_eq!(evento.cliente, "Incorporadora Horizonte");
    }
}

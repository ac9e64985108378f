//! Cronograma de Recebimento Aggregate
//!
//! One billing milestone of a project's contract.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::RecebimentoCronogramaVencido;
use crate::domain::{Amount, DomainError, StatusCronograma};

use super::{liquidar, texto_obrigatorio, TituloFinanceiro};

/// Persisted state of a schedule line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CronogramaRecebimentoEstado {
    pub id: Uuid,
    pub obra_id: Uuid,
    pub numero_etapa: i32,
    pub descricao: String,
    pub valor_previsto: Decimal,
    pub valor_recebido: Decimal,
    pub data_vencimento: DateTime<Utc>,
    pub data_recebimento: Option<DateTime<Utc>>,
    pub status: StatusCronograma,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CronogramaRecebimento {
    id: Uuid,
    obra_id: Uuid,
    numero_etapa: i32,
    descricao: String,
    valor_previsto: Decimal,
    valor_recebido: Decimal,
    data_vencimento: DateTime<Utc>,
    data_recebimento: Option<DateTime<Utc>>,
    status: StatusCronograma,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CronogramaRecebimento {
    pub fn criar(
        obra_id: Uuid,
        numero_etapa: i32,
        descricao: String,
        valor_previsto: Amount,
        data_vencimento: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if numero_etapa < 1 {
            return Err(DomainError::validation("numero_etapa must start at 1"));
        }
        let descricao = texto_obrigatorio("descricao", descricao)?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            obra_id,
            numero_etapa,
            descricao,
            valor_previsto: valor_previsto.value(),
            valor_recebido: Decimal::ZERO,
            data_vencimento,
            data_recebimento: None,
            status: StatusCronograma::Pendente,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn from_db_state(estado: CronogramaRecebimentoEstado) -> Self {
        Self {
            id: estado.id,
            obra_id: estado.obra_id,
            numero_etapa: estado.numero_etapa,
            descricao: estado.descricao,
            valor_previsto: estado.valor_previsto,
            valor_recebido: estado.valor_recebido,
            data_vencimento: estado.data_vencimento,
            data_recebimento: estado.data_recebimento,
            status: estado.status,
            created_at: estado.created_at,
            updated_at: estado.updated_at,
        }
    }

    pub fn estado(&self) -> CronogramaRecebimentoEstado {
        CronogramaRecebimentoEstado {
            id: self.id,
            obra_id: self.obra_id,
            numero_etapa: self.numero_etapa,
            descricao: self.descricao.clone(),
            valor_previsto: self.valor_previsto,
            valor_recebido: self.valor_recebido,
            data_vencimento: self.data_vencimento,
            data_recebimento: self.data_recebimento,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Register money received for this milestone
    pub fn registrar_recebimento(&mut self, valor: Decimal) -> Result<(), DomainError> {
        if self.status == StatusCronograma::Recebido {
            return Err(DomainError::AlreadySettled);
        }

        let valor_recebido = liquidar(self.valor_previsto, self.valor_recebido, valor)?;
        let now = Utc::now();

        self.valor_recebido = valor_recebido;
        self.data_recebimento = Some(now);
        self.updated_at = now;
        self.status = if self.valor_recebido >= self.valor_previsto {
            StatusCronograma::Recebido
        } else {
            StatusCronograma::Parcial
        };

        Ok(())
    }

    pub fn marcar_vencido(&mut self, agora: DateTime<Utc>) -> bool {
        if self.status != StatusCronograma::Pendente || agora <= self.data_vencimento {
            return false;
        }

        self.status = StatusCronograma::Vencido;
        self.updated_at = agora;
        true
    }

    pub fn evento_vencido(&self) -> RecebimentoCronogramaVencido {
        RecebimentoCronogramaVencido {
            cronograma_recebimento_id: self.id,
            obra_id: self.obra_id,
            numero_etapa: self.numero_etapa,
            valor_previsto: self.valor_previsto,
            data_vencimento: self.data_vencimento,
            status: self.status,
        }
    }

    pub fn obra_id(&self) -> Uuid {
        self.obra_id
    }

    pub fn numero_etapa(&self) -> i32 {
        self.numero_etapa
    }

    pub fn descricao(&self) -> &str {
        &self.descricao
    }

    pub fn valor_previsto(&self) -> Decimal {
        self.valor_previsto
    }

    pub fn valor_recebido(&self) -> Decimal {
        self.valor_recebido
    }

    pub fn data_recebimento(&self) -> Option<DateTime<Utc>> {
        self.data_recebimento
    }

    pub fn status(&self) -> StatusCronograma {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl TituloFinanceiro for CronogramaRecebimento {
    fn id(&self) -> Uuid {
        self.id
    }

    fn valor_original(&self) -> Decimal {
        self.valor_previsto
    }

    fn valor_liquidado(&self) -> Decimal {
        self.valor_recebido
    }

    fn data_vencimento(&self) -> DateTime<Utc> {
        self.data_vencimento
    }

    fn esta_quitado(&self) -> bool {
        self.status == StatusCronograma::Recebido
    }

    fn esta_encerrado(&self) -> bool {
        self.esta_quitado()
    }
}

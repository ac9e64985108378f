//! Status and classification enums
//!
//! Shared by the aggregates, the event payloads and the storage layer. All of
//! them travel as SCREAMING_SNAKE_CASE strings (`"PENDENTE"`, `"PARCIAL"`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error for an unknown enum label coming from storage or input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant ),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $label => Ok($name::$variant), )+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

labeled_enum! {
    /// Lifecycle of a conta a pagar
    StatusContaPagar("status_conta_pagar") {
        Pendente => "PENDENTE",
        Parcial => "PARCIAL",
        Pago => "PAGO",
        Vencido => "VENCIDO",
        Cancelado => "CANCELADO",
    }
}

labeled_enum! {
    /// Lifecycle of a conta a receber
    StatusContaReceber("status_conta_receber") {
        Pendente => "PENDENTE",
        Parcial => "PARCIAL",
        Recebido => "RECEBIDO",
        Vencido => "VENCIDO",
        Cancelado => "CANCELADO",
    }
}

labeled_enum! {
    /// Lifecycle of a billing schedule line (no cancellation)
    StatusCronograma("status_cronograma") {
        Pendente => "PENDENTE",
        Parcial => "PARCIAL",
        Recebido => "RECEBIDO",
        Vencido => "VENCIDO",
    }
}

labeled_enum! {
    /// What a conta a pagar is paying for
    CategoriaContaPagar("categoria_conta_pagar") {
        Fornecedor => "FORNECEDOR",
        Servico => "SERVICO",
        Material => "MATERIAL",
        Outros => "OUTROS",
    }
}

labeled_enum! {
    /// Direction of a financial movement
    TipoMovimentacao("tipo_movimentacao") {
        Entrada => "ENTRADA",
        Saida => "SAIDA",
    }
}

labeled_enum! {
    /// Source document of a financial movement
    TipoDocumento("tipo_documento") {
        ContaPagar => "CONTA_PAGAR",
        ContaReceber => "CONTA_RECEBER",
    }
}

impl Default for StatusContaPagar {
    fn default() -> Self {
        Self::Pendente
    }
}

impl Default for StatusContaReceber {
    fn default() -> Self {
        Self::Pendente
    }
}

impl Default for StatusCronograma {
    fn default() -> Self {
        Self::Pendente
    }
}

impl Default for CategoriaContaPagar {
    fn default() -> Self {
        Self::Fornecedor
    }
}

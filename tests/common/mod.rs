//! Common test utilities

#![allow(dead_code)]

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use obra_financeiro::repository::{
    status_apontamento, ApontamentoResumo, ContaReceberRepository, MemoryApontamentoRepository,
    MemoryContaPagarRepository, MemoryContaReceberRepository, MemoryCronogramaRepository,
    MemoryOrcamentoRepository, OrcamentoResumo,
};
use obra_financeiro::subscribers::{self, SubscriberConfig};
use obra_financeiro::{AppError, AppState, Event, EventBus, OperationContext, Repositorios};

/// In-memory application with the choreography wired in
pub struct TestApp {
    pub state: AppState,
    pub orcamentos: Arc<MemoryOrcamentoRepository>,
    pub apontamentos: Arc<MemoryApontamentoRepository>,
}

/// Build the in-memory application state and register every subscriber
pub fn setup_test_app() -> TestApp {
    setup_test_app_with_contas_receber(Arc::new(MemoryContaReceberRepository::new()))
}

/// Same as `setup_test_app`, with a caller-supplied receivables store
pub fn setup_test_app_with_contas_receber(
    contas_receber: Arc<dyn ContaReceberRepository>,
) -> TestApp {
    let orcamentos = Arc::new(MemoryOrcamentoRepository::new());
    let apontamentos = Arc::new(MemoryApontamentoRepository::new());

    let repos = Repositorios {
        contas_pagar: Arc::new(MemoryContaPagarRepository::new()),
        contas_receber,
        cronogramas: Arc::new(MemoryCronogramaRepository::new()),
        orcamentos: orcamentos.clone(),
        apontamentos: apontamentos.clone(),
    };

    let state = AppState::new(repos, EventBus::new());
    subscribers::register_all(&state, SubscriberConfig::default());

    TestApp {
        state,
        orcamentos,
        apontamentos,
    }
}

impl TestApp {
    pub async fn seed_orcamento(&self, status: &str, valor: Decimal) -> OrcamentoResumo {
        let orcamento = OrcamentoResumo {
            id: Uuid::new_v4(),
            obra_id: Some(Uuid::new_v4()),
            etapa_id: Some(Uuid::new_v4()),
            fornecedor_id: Some(Uuid::new_v4()),
            fornecedor_nome: "Concreto Já".to_string(),
            status: status.to_string(),
            valor,
            numero_documento: None,
            data_pagamento_prevista: None,
            excluido: false,
        };
        self.orcamentos.inserir(orcamento.clone()).await;
        orcamento
    }

    pub async fn seed_orcamento_com_documento(
        &self,
        status: &str,
        valor: Decimal,
        numero_documento: &str,
        data_pagamento_prevista: DateTime<Utc>,
    ) -> OrcamentoResumo {
        let mut orcamento = self.seed_orcamento(status, valor).await;
        orcamento.numero_documento = Some(numero_documento.to_string());
        orcamento.data_pagamento_prevista = Some(data_pagamento_prevista);
        self.orcamentos.inserir(orcamento.clone()).await;
        orcamento
    }

    pub async fn seed_apontamento(&self, valor_total: Decimal) -> ApontamentoResumo {
        let apontamento = ApontamentoResumo {
            id: Uuid::new_v4(),
            funcionario_id: Uuid::new_v4(),
            funcionario_nome: "Maria Armadora".to_string(),
            obra_id: Some(Uuid::new_v4()),
            periodo_inicio: Utc::now() - chrono::Duration::days(14),
            periodo_fim: Utc::now(),
            valor_total,
            status: status_apontamento::PENDENTE.to_string(),
        };
        self.apontamentos.inserir(apontamento.clone()).await;
        apontamento
    }
}

/// Subscribe a recorder to `topic`; returns the delivered events
pub fn record(bus: &EventBus, topic: &str) -> Arc<Mutex<Vec<Event>>> {
    let recebidos = Arc::new(Mutex::new(Vec::new()));
    let sink = recebidos.clone();
    bus.subscribe(topic, move |_ctx: OperationContext, event: Event| {
        let sink = sink.clone();
        async move {
            sink.lock().unwrap().push(event);
            Ok::<(), AppError>(())
        }
    });
    recebidos
}

/// Poll `check` until it holds or two seconds pass
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// Let in-flight dispatches finish
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

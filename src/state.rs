//! Application state
//!
//! The service graph shared by the HTTP layer, the event subscribers and the
//! job scheduler. Built once at start-up around a single `EventBus`.

use std::sync::Arc;

use sqlx::PgPool;

use crate::bus::EventBus;
use crate::handlers::{
    ApontamentoService, ContaPagarService, ContaReceberService, CronogramaService,
    OrcamentoService,
};
use crate::repository::{
    ApontamentoRepository, ContaPagarRepository, ContaReceberRepository, CronogramaRepository,
    MemoryApontamentoRepository, MemoryContaPagarRepository, MemoryContaReceberRepository,
    MemoryCronogramaRepository, MemoryOrcamentoRepository, OrcamentoRepository,
    PgApontamentoRepository, PgContaPagarRepository, PgContaReceberRepository,
    PgCronogramaRepository, PgOrcamentoRepository,
};

/// One implementation per storage seam
#[derive(Clone)]
pub struct Repositorios {
    pub contas_pagar: Arc<dyn ContaPagarRepository>,
    pub contas_receber: Arc<dyn ContaReceberRepository>,
    pub cronogramas: Arc<dyn CronogramaRepository>,
    pub orcamentos: Arc<dyn OrcamentoRepository>,
    pub apontamentos: Arc<dyn ApontamentoRepository>,
}

impl Repositorios {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            contas_pagar: Arc::new(PgContaPagarRepository::new(pool.clone())),
            contas_receber: Arc::new(PgContaReceberRepository::new(pool.clone())),
            cronogramas: Arc::new(PgCronogramaRepository::new(pool.clone())),
            orcamentos: Arc::new(PgOrcamentoRepository::new(pool.clone())),
            apontamentos: Arc::new(PgApontamentoRepository::new(pool)),
        }
    }

    pub fn memory() -> Self {
        Self {
            contas_pagar: Arc::new(MemoryContaPagarRepository::new()),
            contas_receber: Arc::new(MemoryContaReceberRepository::new()),
            cronogramas: Arc::new(MemoryCronogramaRepository::new()),
            orcamentos: Arc::new(MemoryOrcamentoRepository::new()),
            apontamentos: Arc::new(MemoryApontamentoRepository::new()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub bus: EventBus,
    pub contas_pagar: ContaPagarService,
    pub contas_receber: ContaReceberService,
    pub cronogramas: CronogramaService,
    pub orcamentos: OrcamentoService,
    pub apontamentos: ApontamentoService,
}

impl AppState {
    pub fn new(repos: Repositorios, bus: EventBus) -> Self {
        let contas_pagar = ContaPagarService::new(repos.contas_pagar, bus.clone());
        let contas_receber = ContaReceberService::new(repos.contas_receber, bus.clone());
        let cronogramas = CronogramaService::new(repos.cronogramas, bus.clone());
        let orcamentos = OrcamentoService::new(repos.orcamentos, contas_pagar.clone(), bus.clone());
        let apontamentos = ApontamentoService::new(repos.apontamentos, bus.clone());

        Self {
            bus,
            contas_pagar,
            contas_receber,
            cronogramas,
            orcamentos,
            apontamentos,
        }
    }
}

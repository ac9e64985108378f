//! In-memory repositories
//!
//! HashMap-backed implementations of the storage traits. Used by the test
//! suites and by anything that wants the full service graph without a
//! database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::aggregate::{ContaPagar, ContaReceber, CronogramaRecebimento, TituloFinanceiro};
use crate::domain::{StatusContaPagar, StatusContaReceber, StatusCronograma};

use super::{
    ApontamentoRepository, ApontamentoResumo, ContaPagarRepository, ContaReceberRepository,
    CronogramaRepository, FiltroContas, OrcamentoRepository, OrcamentoResumo, RepositoryError,
    RepositoryResult,
};

/// Apply offset/limit to an already ordered listing
fn paginar<T>(itens: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    itens
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

// =========================================================================
// Contas a pagar
// =========================================================================

#[derive(Debug, Default)]
pub struct MemoryContaPagarRepository {
    contas: RwLock<HashMap<Uuid, ContaPagar>>,
}

impl MemoryContaPagarRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtrar<P>(&self, predicado: P) -> Vec<ContaPagar>
    where
        P: Fn(&ContaPagar) -> bool,
    {
        let contas = self.contas.read().await;
        let mut encontradas: Vec<ContaPagar> =
            contas.values().filter(|c| predicado(c)).cloned().collect();
        encontradas.sort_by_key(|c| c.created_at());
        encontradas
    }
}

#[async_trait]
impl ContaPagarRepository for MemoryContaPagarRepository {
    async fn inserir(&self, conta: &ContaPagar) -> RepositoryResult<()> {
        let mut contas = self.contas.write().await;
        let mesma_origem = |c: &ContaPagar| {
            c.status() != StatusContaPagar::Cancelado
                && ((conta.orcamento_id().is_some() && c.orcamento_id() == conta.orcamento_id())
                    || (conta.apontamento_id().is_some()
                        && c.apontamento_id() == conta.apontamento_id()))
        };
        if let Some(existente) = contas.values().find(|c| mesma_origem(*c)) {
            return Err(RepositoryError::Conflict(format!(
                "active payable {} already derived from the same source",
                existente.id()
            )));
        }
        contas.insert(conta.id(), conta.clone());
        Ok(())
    }

    async fn atualizar(&self, conta: &ContaPagar) -> RepositoryResult<()> {
        match self.contas.write().await.get_mut(&conta.id()) {
            Some(atual) => {
                *atual = conta.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound {
                entidade: "ContaPagar",
                id: conta.id(),
            }),
        }
    }

    async fn buscar(&self, id: Uuid) -> RepositoryResult<Option<ContaPagar>> {
        Ok(self.contas.read().await.get(&id).cloned())
    }

    async fn listar(
        &self,
        filtro: &FiltroContas<StatusContaPagar>,
    ) -> RepositoryResult<Vec<ContaPagar>> {
        let mut contas = self
            .filtrar(|c| {
                filtro.status.map_or(true, |s| c.status() == s)
                    && filtro.obra_id.map_or(true, |o| c.obra_id() == Some(o))
            })
            .await;
        contas.sort_by_key(|c| c.data_vencimento());
        Ok(paginar(contas, filtro.limit, filtro.offset))
    }

    async fn listar_por_orcamento(&self, orcamento_id: Uuid) -> RepositoryResult<Vec<ContaPagar>> {
        Ok(self
            .filtrar(|c| c.orcamento_id() == Some(orcamento_id))
            .await)
    }

    async fn listar_por_apontamento(
        &self,
        apontamento_id: Uuid,
    ) -> RepositoryResult<Vec<ContaPagar>> {
        Ok(self
            .filtrar(|c| c.apontamento_id() == Some(apontamento_id))
            .await)
    }

    async fn listar_pendentes_vencidas(
        &self,
        agora: DateTime<Utc>,
    ) -> RepositoryResult<Vec<ContaPagar>> {
        Ok(self
            .filtrar(|c| c.status() == StatusContaPagar::Pendente && c.data_vencimento() < agora)
            .await)
    }
}

// =========================================================================
// Contas a receber
// =========================================================================

#[derive(Debug, Default)]
pub struct MemoryContaReceberRepository {
    contas: RwLock<HashMap<Uuid, ContaReceber>>,
}

impl MemoryContaReceberRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtrar<P>(&self, predicado: P) -> Vec<ContaReceber>
    where
        P: Fn(&ContaReceber) -> bool,
    {
        let contas = self.contas.read().await;
        let mut encontradas: Vec<ContaReceber> =
            contas.values().filter(|c| predicado(c)).cloned().collect();
        encontradas.sort_by_key(|c| c.created_at());
        encontradas
    }
}

#[async_trait]
impl ContaReceberRepository for MemoryContaReceberRepository {
    async fn inserir(&self, conta: &ContaReceber) -> RepositoryResult<()> {
        let mut contas = self.contas.write().await;
        if let Some(linha) = conta.cronograma_recebimento_id() {
            let duplicada = contas.values().any(|c| {
                c.status() != StatusContaReceber::Cancelado
                    && c.cronograma_recebimento_id() == Some(linha)
            });
            if duplicada {
                return Err(RepositoryError::Conflict(format!(
                    "schedule line {} already has an active receivable",
                    linha
                )));
            }
        }
        contas.insert(conta.id(), conta.clone());
        Ok(())
    }

    async fn atualizar(&self, conta: &ContaReceber) -> RepositoryResult<()> {
        match self.contas.write().await.get_mut(&conta.id()) {
            Some(atual) => {
                *atual = conta.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound {
                entidade: "ContaReceber",
                id: conta.id(),
            }),
        }
    }

    async fn buscar(&self, id: Uuid) -> RepositoryResult<Option<ContaReceber>> {
        Ok(self.contas.read().await.get(&id).cloned())
    }

    async fn listar(
        &self,
        filtro: &FiltroContas<StatusContaReceber>,
    ) -> RepositoryResult<Vec<ContaReceber>> {
        let mut contas = self
            .filtrar(|c| {
                filtro.status.map_or(true, |s| c.status() == s)
                    && filtro.obra_id.map_or(true, |o| c.obra_id() == Some(o))
            })
            .await;
        contas.sort_by_key(|c| c.data_vencimento());
        Ok(paginar(contas, filtro.limit, filtro.offset))
    }

    async fn listar_por_cronograma(
        &self,
        cronograma_recebimento_id: Uuid,
    ) -> RepositoryResult<Vec<ContaReceber>> {
        Ok(self
            .filtrar(|c| c.cronograma_recebimento_id() == Some(cronograma_recebimento_id))
            .await)
    }

    async fn listar_pendentes_vencidas(
        &self,
        agora: DateTime<Utc>,
    ) -> RepositoryResult<Vec<ContaReceber>> {
        Ok(self
            .filtrar(|c| {
                c.status() == StatusContaReceber::Pendente && c.data_vencimento() < agora
            })
            .await)
    }
}

// =========================================================================
// Cronogramas de recebimento
// =========================================================================

#[derive(Debug, Default)]
pub struct MemoryCronogramaRepository {
    linhas: RwLock<HashMap<Uuid, CronogramaRecebimento>>,
}

impl MemoryCronogramaRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CronogramaRepository for MemoryCronogramaRepository {
    async fn inserir_lote(&self, linhas: &[CronogramaRecebimento]) -> RepositoryResult<()> {
        let mut guard = self.linhas.write().await;
        for linha in linhas {
            guard.insert(linha.id(), linha.clone());
        }
        Ok(())
    }

    async fn atualizar(&self, linha: &CronogramaRecebimento) -> RepositoryResult<()> {
        match self.linhas.write().await.get_mut(&linha.id()) {
            Some(atual) => {
                *atual = linha.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound {
                entidade: "CronogramaRecebimento",
                id: linha.id(),
            }),
        }
    }

    async fn buscar(&self, id: Uuid) -> RepositoryResult<Option<CronogramaRecebimento>> {
        Ok(self.linhas.read().await.get(&id).cloned())
    }

    async fn listar_por_obra(&self, obra_id: Uuid) -> RepositoryResult<Vec<CronogramaRecebimento>> {
        let linhas = self.linhas.read().await;
        let mut encontradas: Vec<CronogramaRecebimento> = linhas
            .values()
            .filter(|l| l.obra_id() == obra_id)
            .cloned()
            .collect();
        encontradas.sort_by_key(|l| l.numero_etapa());
        Ok(encontradas)
    }

    async fn listar_pendentes_vencidos(
        &self,
        agora: DateTime<Utc>,
    ) -> RepositoryResult<Vec<CronogramaRecebimento>> {
        let linhas = self.linhas.read().await;
        let mut encontradas: Vec<CronogramaRecebimento> = linhas
            .values()
            .filter(|l| l.status() == StatusCronograma::Pendente && l.data_vencimento() < agora)
            .cloned()
            .collect();
        encontradas.sort_by_key(|l| l.data_vencimento());
        Ok(encontradas)
    }
}

// =========================================================================
// Collaborator records
// =========================================================================

#[derive(Debug, Default)]
pub struct MemoryOrcamentoRepository {
    orcamentos: RwLock<HashMap<Uuid, OrcamentoResumo>>,
}

impl MemoryOrcamentoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a budget; budgets are owned by the Budgets context
    pub async fn inserir(&self, orcamento: OrcamentoResumo) {
        self.orcamentos.write().await.insert(orcamento.id, orcamento);
    }
}

#[async_trait]
impl OrcamentoRepository for MemoryOrcamentoRepository {
    async fn buscar_resumo(&self, id: Uuid) -> RepositoryResult<Option<OrcamentoResumo>> {
        Ok(self.orcamentos.read().await.get(&id).cloned())
    }

    async fn atualizar_status(&self, id: Uuid, status: &str) -> RepositoryResult<()> {
        if let Some(orcamento) = self.orcamentos.write().await.get_mut(&id) {
            orcamento.status = status.to_string();
        }
        Ok(())
    }

    async fn marcar_excluido(&self, id: Uuid) -> RepositoryResult<()> {
        if let Some(orcamento) = self.orcamentos.write().await.get_mut(&id) {
            orcamento.excluido = true;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryApontamentoRepository {
    apontamentos: RwLock<HashMap<Uuid, ApontamentoResumo>>,
}

impl MemoryApontamentoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a timesheet; timesheets are owned by the Pessoal context
    pub async fn inserir(&self, apontamento: ApontamentoResumo) {
        self.apontamentos
            .write()
            .await
            .insert(apontamento.id, apontamento);
    }
}

#[async_trait]
impl ApontamentoRepository for MemoryApontamentoRepository {
    async fn buscar_resumo(&self, id: Uuid) -> RepositoryResult<Option<ApontamentoResumo>> {
        Ok(self.apontamentos.read().await.get(&id).cloned())
    }

    async fn atualizar_status(&self, id: Uuid, status: &str) -> RepositoryResult<()> {
        if let Some(apontamento) = self.apontamentos.write().await.get_mut(&id) {
            apontamento.status = status.to_string();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::NovaContaPagar;
    use crate::domain::{Amount, CategoriaContaPagar};
    use chrono::Duration;

    fn conta(obra_id: Option<Uuid>, vencimento: DateTime<Utc>) -> ContaPagar {
        ContaPagar::criar(nova_conta(obra_id, vencimento)).unwrap()
    }

    fn nova_conta(obra_id: Option<Uuid>, vencimento: DateTime<Utc>) -> NovaContaPagar {
        NovaContaPagar {
            fornecedor_id: None,
            obra_id,
            orcamento_id: None,
            apontamento_id: None,
            fornecedor_nome: "Areia & Brita".to_string(),
            categoria: CategoriaContaPagar::Material,
            descricao: "Brita 1".to_string(),
            valor_original: Amount::from_integer(100).unwrap(),
            data_vencimento: vencimento,
            numero_documento: None,
            observacoes: None,
        }
    }

    #[tokio::test]
    async fn test_listing_filters_and_pages() {
        let repo = MemoryContaPagarRepository::new();
        let obra = Uuid::new_v4();
        for dias in 1..=5 {
            repo.inserir(&conta(Some(obra), Utc::now() + Duration::days(dias)))
                .await
                .unwrap();
        }
        repo.inserir(&conta(None, Utc::now())).await.unwrap();

        let filtro = FiltroContas {
            obra_id: Some(obra),
            limit: 2,
            offset: 1,
            ..Default::default()
        };
        let pagina = repo.listar(&filtro).await.unwrap();

        assert_eq!(pagina.len(), 2);
        assert!(pagina[0].data_vencimento() < pagina[1].data_vencimento());
        assert!(pagina.iter().all(|c| c.obra_id() == Some(obra)));
    }

    #[tokio::test]
    async fn test_overdue_listing_only_pending() {
        let repo = MemoryContaPagarRepository::new();
        let vencida = conta(None, Utc::now() - Duration::days(1));
        let mut paga = conta(None, Utc::now() - Duration::days(1));
        paga.registrar_pagamento(rust_decimal::Decimal::ONE_HUNDRED, None, None)
            .unwrap();
        let futura = conta(None, Utc::now() + Duration::days(1));

        for c in [&vencida, &paga, &futura] {
            repo.inserir(c).await.unwrap();
        }

        let encontradas = repo.listar_pendentes_vencidas(Utc::now()).await.unwrap();
        assert_eq!(encontradas.len(), 1);
        assert_eq!(encontradas[0].id(), vencida.id());
    }

    #[tokio::test]
    async fn test_update_of_missing_row_is_not_found() {
        let repo = MemoryContaPagarRepository::new();
        let fantasma = conta(None, Utc::now());

        let err = repo.atualizar(&fantasma).await.unwrap_err();

        assert!(matches!(
            err,
            RepositoryError::NotFound { entidade: "ContaPagar", id } if id == fantasma.id()
        ));
        assert!(repo.buscar(fantasma.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_active_payable_for_same_budget_conflicts() {
        let repo = MemoryContaPagarRepository::new();
        let orcamento_id = Uuid::new_v4();
        let de_orcamento = |orcamento_id| {
            ContaPagar::criar(NovaContaPagar {
                orcamento_id: Some(orcamento_id),
                ..nova_conta(None, Utc::now())
            })
            .unwrap()
        };

        let mut primeira = de_orcamento(orcamento_id);
        repo.inserir(&primeira).await.unwrap();
        let err = repo.inserir(&de_orcamento(orcamento_id)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        // a cancelled payable frees the budget
        primeira.cancelar(None).unwrap();
        repo.atualizar(&primeira).await.unwrap();
        repo.inserir(&de_orcamento(orcamento_id)).await.unwrap();
    }
}

// ==========================================
// 故障注入仓储 - 用于集成测试
// ==========================================
// 包装真实的 SqliteCompanyRepository，按配置注入:
// - 指定名称的写入失败（单条失败）
// - N 次新建后仓储整体不可用（致命错误）
// - N 次新建后触发取消令牌
// ==========================================

use async_trait::async_trait;
use crm_reconcile::domain::{Company, CompanyPatch};
use crm_reconcile::importer::CancellationToken;
use crm_reconcile::repository::{
    CompanyRepository, RepositoryError, RepositoryResult, SqliteCompanyRepository,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct FaultyCompanyRepository {
    inner: SqliteCompanyRepository,
    failing_names: HashSet<String>,
    fatal_after_creates: Option<usize>,
    cancel_after_creates: Option<(usize, CancellationToken)>,
    creates: AtomicUsize,
}

impl FaultyCompanyRepository {
    pub fn new(inner: SqliteCompanyRepository) -> Self {
        Self {
            inner,
            failing_names: HashSet::new(),
            fatal_after_creates: None,
            cancel_after_creates: None,
            creates: AtomicUsize::new(0),
        }
    }

    /// 指定名称的新建/更新返回查询错误
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing_names.insert(name.to_string());
        self
    }

    /// 成功新建 n 条之后，所有调用返回锁错误
    pub fn fatal_after(mut self, n: usize) -> Self {
        self.fatal_after_creates = Some(n);
        self
    }

    /// 成功新建 n 条之后触发取消
    pub fn cancel_after(mut self, n: usize, token: CancellationToken) -> Self {
        self.cancel_after_creates = Some((n, token));
        self
    }

    pub fn created(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    fn check_fatal(&self) -> RepositoryResult<()> {
        match self.fatal_after_creates {
            Some(n) if self.created() >= n => Err(RepositoryError::LockError(
                "injected: connection mutex poisoned".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn check_name(&self, name: &str) -> RepositoryResult<()> {
        if self.failing_names.contains(name) {
            return Err(RepositoryError::DatabaseQueryError(
                "injected write failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CompanyRepository for FaultyCompanyRepository {
    async fn find_by_name_ci(&self, name: &str) -> RepositoryResult<Option<Company>> {
        self.check_fatal()?;
        self.inner.find_by_name_ci(name).await
    }

    async fn find_by_website(&self, website: &str) -> RepositoryResult<Option<Company>> {
        self.check_fatal()?;
        self.inner.find_by_website(website).await
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Company>> {
        self.check_fatal()?;
        self.inner.find_by_id(id).await
    }

    async fn create(&self, company: &Company) -> RepositoryResult<()> {
        self.check_fatal()?;
        self.check_name(&company.name)?;
        self.inner.create(company).await?;

        let created = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((n, token)) = &self.cancel_after_creates {
            if created >= *n {
                token.cancel();
            }
        }
        Ok(())
    }

    async fn update(&self, id: &str, patch: &CompanyPatch) -> RepositoryResult<()> {
        self.check_fatal()?;
        if let Some(existing) = self.inner.find_by_id(id).await? {
            self.check_name(&existing.name)?;
        }
        self.inner.update(id, patch).await
    }

    async fn count(&self) -> RepositoryResult<usize> {
        self.inner.count().await
    }
}

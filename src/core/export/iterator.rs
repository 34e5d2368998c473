//! Paged record iteration

use crate::adapters::traits::{PageRequest, RecordSource};
use crate::domain::{RecordBatch, RecordFilter, Result, SortSpec};

/// Page-by-page cursor over the records matching a filter
///
/// The total is counted once when the iterator opens. Iteration ends with
/// the first short or empty page, or once the total has been fetched.
pub struct RecordIterator<'a> {
    source: &'a dyn RecordSource,
    filter: &'a RecordFilter,
    sort: Option<&'a SortSpec>,
    page_size: usize,
    total: usize,
    next_index: usize,
    fetched: usize,
    done: bool,
}

impl<'a> RecordIterator<'a> {
    /// Opens the iterator and counts the matching records
    pub async fn open(
        source: &'a dyn RecordSource,
        filter: &'a RecordFilter,
        sort: Option<&'a SortSpec>,
        page_size: usize,
    ) -> Result<Self> {
        let total = source.count(filter).await?;
        Ok(Self {
            source,
            filter,
            sort,
            page_size: page_size.max(1),
            total,
            next_index: 0,
            fetched: 0,
            done: total == 0,
        })
    }

    /// Number of records matching the filter
    pub fn total_count(&self) -> usize {
        self.total
    }

    /// True once no further page will be fetched
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Number of pages fetched so far
    pub fn pages_fetched(&self) -> usize {
        self.next_index
    }

    /// Fetches the next page, `None` when iteration is over
    pub async fn next_page(&mut self) -> Result<Option<RecordBatch>> {
        if self.done {
            return Ok(None);
        }

        let request = PageRequest::nth(self.next_index, self.page_size);
        let batch = self.source.fetch_page(self.filter, self.sort, request).await?;

        if batch.is_empty() {
            self.done = true;
            return Ok(None);
        }

        self.next_index += 1;
        self.fetched += batch.len();
        if batch.len() < self.page_size || self.fetched >= self.total {
            self.done = true;
        }
        Ok(Some(batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::dataset::JsonDataset;
    use crate::domain::ModelName;

    fn dataset(records: usize) -> JsonDataset {
        let records: Vec<_> = (1..=records)
            .map(|i| serde_json::json!({"id": i.to_string(), "n": i}))
            .collect();
        let json = serde_json::json!({
            "model": "Crm_Model_Lead",
            "fields": ["id", "n"],
            "records": records,
        });
        JsonDataset::from_json(&json.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_pages_until_exhausted() {
        let ds = dataset(5);
        let filter = RecordFilter::all(ModelName::new("Crm_Model_Lead").unwrap());
        let mut it = RecordIterator::open(&ds, &filter, None, 2).await.unwrap();
        assert_eq!(it.total_count(), 5);

        let mut sizes = Vec::new();
        while let Some(page) = it.next_page().await.unwrap() {
            sizes.push(page.len());
        }
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(it.pages_fetched(), 3);
    }

    #[tokio::test]
    async fn test_exact_multiple_needs_no_extra_fetch() {
        let ds = dataset(4);
        let filter = RecordFilter::all(ModelName::new("Crm_Model_Lead").unwrap());
        let mut it = RecordIterator::open(&ds, &filter, None, 2).await.unwrap();
        assert!(it.next_page().await.unwrap().is_some());
        assert!(!it.is_done());
        assert!(it.next_page().await.unwrap().is_some());
        // the last full page already ends iteration
        assert!(it.is_done());
        assert!(it.next_page().await.unwrap().is_none());
        assert_eq!(it.pages_fetched(), 2);
    }

    #[tokio::test]
    async fn test_no_matches_yields_no_page() {
        let ds = dataset(0);
        let filter = RecordFilter::all(ModelName::new("Crm_Model_Lead").unwrap());
        let mut it = RecordIterator::open(&ds, &filter, None, 10).await.unwrap();
        assert!(it.is_done());
        assert!(it.next_page().await.unwrap().is_none());
    }
}

//! Lazy page sequences driven by [`Integrator::paginate`].

// crates.io
use futures::{Stream, stream};
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	http::Transport,
	integrator::Integrator,
	obs::{self, CallKind},
	paginate::{PaginationConfig, PaginationCursor},
	request::{Params, Request, Response},
};

/// Lazily fetched pages of one collection.
///
/// Each [`next`](Self::next) sends exactly one page request through the owning integrator,
/// so every page is rate limited and retried like a standalone request. The sequence ends
/// after the first error or non-2xx response (both are yielded first), when the cursor
/// reports no further page, or when `max_pages` is reached.
pub struct Pages<'a, T>
where
	T: ?Sized + Transport,
{
	integrator: &'a Integrator<T>,
	template: Request,
	cursor: PaginationCursor,
	next_query: Option<Params>,
	seen: usize,
	pages: u32,
	max_pages: Option<u32>,
	cancel: Option<CancellationToken>,
}
impl<'a, T> Pages<'a, T>
where
	T: ?Sized + Transport,
{
	pub(crate) fn new(
		integrator: &'a Integrator<T>,
		template: Request,
		config: &PaginationConfig,
	) -> Self {
		let cursor = PaginationCursor::new(config.style.clone());
		let next_query = Some(cursor.seed(template.query.clone()));

		Self {
			integrator,
			template,
			cursor,
			next_query,
			seen: 0,
			pages: 0,
			max_pages: config.max_pages,
			cancel: None,
		}
	}

	/// Aborts pending waits with [`Error::Cancelled`] once `token` fires.
	pub fn with_cancel(mut self, token: CancellationToken) -> Self {
		self.cancel = Some(token);

		self
	}

	/// Pages fetched so far.
	pub fn pages_fetched(&self) -> u32 {
		self.pages
	}

	/// Items received so far across every successful page.
	pub fn items_seen(&self) -> usize {
		self.seen
	}

	/// True once the sequence has nothing left to yield.
	pub fn is_done(&self) -> bool {
		self.next_query.is_none()
	}

	/// Fetches the next page, or returns `None` when the sequence is finished.
	pub async fn next(&mut self) -> Option<Result<Response>> {
		let query = self.next_query.take()?;
		let mut request = self.template.clone();

		request.query = query.clone();

		let result = self.integrator.call(CallKind::Page, request, self.cancel.as_ref()).await;

		self.pages += 1;

		let reason = match &result {
			Ok(response) if response.is_success() => {
				let body = response.json();

				self.seen += body.and_then(|body| self.cursor.items(body)).map_or(0, Vec::len);
				self.next_query =
					body.and_then(|body| self.cursor.next_params(&query, body, self.seen));

				if self.next_query.is_none() {
					Some("exhausted")
				} else if self.max_pages.is_some_and(|max| self.pages >= max) {
					self.next_query = None;

					Some("max_pages")
				} else {
					None
				}
			},
			Ok(_) => Some("status"),
			Err(e) if e.is_cancelled() => Some("cancelled"),
			Err(_) => Some("error"),
		};

		if let Some(reason) = reason {
			obs::pagination_finished(self.pages, self.seen, reason);
		}

		Some(result)
	}

	/// Drains the sequence, keeping whatever arrived before a failure.
	pub async fn collect(mut self) -> Collected {
		let mut collected = Collected::default();

		while let Some(result) = self.next().await {
			match result {
				Ok(response) => {
					if response.is_success()
						&& let Some(items) = response.json().and_then(|b| self.cursor.items(b))
					{
						collected.items.extend(items.iter().cloned());
					}

					collected.responses.push(response);
				},
				Err(e) => collected.error = Some(e),
			}
		}

		collected
	}

	/// Adapts the sequence into a [`Stream`] of page results.
	pub fn into_stream(self) -> impl Stream<Item = Result<Response>> + 'a {
		stream::unfold(self, |mut pages| async move {
			let page = pages.next().await?;

			Some((page, pages))
		})
	}
}
impl<T> Debug for Pages<'_, T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Pages")
			.field("path", &self.template.path)
			.field("style", &self.cursor.style().as_str())
			.field("pages", &self.pages)
			.field("seen", &self.seen)
			.field("done", &self.is_done())
			.finish()
	}
}

/// Everything a drained [`Pages`] sequence produced.
#[derive(Debug, Default)]
pub struct Collected {
	/// Items from every successful page, in order.
	pub items: Vec<Value>,
	/// Every response received, including a trailing non-2xx one.
	pub responses: Vec<Response>,
	/// Error that ended the sequence early.
	pub error: Option<Error>,
}
impl Collected {
	/// True when the sequence ended without an error or a non-2xx response.
	pub fn is_complete(&self) -> bool {
		self.error.is_none() && self.responses.last().is_none_or(Response::is_success)
	}
}

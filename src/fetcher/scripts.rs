//! JavaScript evaluated inside rendered pages

/// Snapshot of a rendered page
///
/// Attribute values are read with `getAttribute` so that image sources match
/// the markup byte for byte and can be replaced textually later.
pub const PAGE_SNAPSHOT_SCRIPT: &str = r"
(() => {
    const nav = performance.getEntriesByType('navigation')[0];
    const status = nav && typeof nav.responseStatus === 'number' && nav.responseStatus > 0
        ? nav.responseStatus
        : null;
    const attrs = (selector, name) => Array.from(document.querySelectorAll(selector))
        .map(el => el.getAttribute(name))
        .filter(v => v !== null);
    return {
        statusCode: status,
        finalUrl: window.location.href,
        title: document.title || '',
        text: document.body ? document.body.innerText || '' : '',
        html: document.documentElement ? document.documentElement.outerHTML : '',
        imageSources: attrs('img[src]', 'src'),
        linkHrefs: attrs('a[href], area[href]', 'href'),
    };
})()
";

/// Readiness probe used by `WaitCondition::Settled`
pub const READY_STATE_SCRIPT: &str = r"
(() => ({
    readyState: document.readyState,
    imagesLoaded: Array.from(document.images).every(img => img.complete),
    bodyExists: document.body !== null,
}))()
";

//! Single-page dashboard. Polls `/api/view` and hands the projections to ECharts.

pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Trading Replay Dashboard</title>
    <script src="https://cdn.jsdelivr.net/npm/echarts@5.5.0/dist/echarts.min.js"></script>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #f5f7fa;
            color: #333;
        }
        .header {
            padding: 12px 24px;
            background: #fff;
            border-bottom: 1px solid #e0e4e9;
            display: flex;
            align-items: center;
            gap: 16px;
            flex-wrap: wrap;
        }
        .header h1 { font-size: 18px; color: #2384ff; font-weight: 600; }
        .days { display: flex; gap: 8px; flex-wrap: wrap; }
        button {
            background: #fff;
            border: 1px solid #e0e4e9;
            color: #555;
            padding: 6px 12px;
            border-radius: 4px;
            font-size: 13px;
            cursor: pointer;
        }
        button.active { background: #2384ff; border-color: #2384ff; color: #fff; }
        .status { margin-left: auto; font-size: 13px; color: #787b86; }
        #chart { width: 100%; height: 600px; background: #fff; }
        .summary { padding: 16px 24px; }
        .summary h2 { font-size: 16px; margin-bottom: 8px; }
        .totals { font-size: 13px; color: #555; margin-bottom: 8px; }
        table { width: 100%; border-collapse: collapse; background: #fff; font-size: 13px; }
        th, td { padding: 6px 10px; border-bottom: 1px solid #e0e4e9; text-align: left; }
        th { background: #f0f3f8; }
        .pos { color: #10b981; }
        .neg { color: #ef4444; }
    </style>
</head>
<body>
    <div class="header">
        <h1>Trading Analytics Dashboard</h1>
        <div class="days" id="days"></div>
        <div class="status" id="status">loading…</div>
    </div>
    <div id="chart"></div>
    <div class="summary">
        <h2>Trade Summary</h2>
        <div class="totals" id="totals"></div>
        <table>
            <thead>
                <tr><th>Time</th><th>Entry Price</th><th>Stop Loss</th><th>Exit Price</th>
                    <th>Trade Type</th><th>Signal</th><th>Points Capture</th></tr>
            </thead>
            <tbody id="trades"></tbody>
        </table>
    </div>
    <script>
        const chart = echarts.init(document.getElementById('chart'));
        const pinColor = { Entry: 'green', StopLoss: 'red', TakeProfit: 'blue', Exit: 'orange' };

        function fmtDay(day) {
            return new Date(day + 'T00:00:00').toLocaleDateString('en-GB',
                { day: '2-digit', month: 'short', year: 'numeric' });
        }

        async function loadDays() {
            const res = await fetch('/api/days');
            const data = await res.json();
            const container = document.getElementById('days');
            container.innerHTML = '';
            for (const d of data.days) {
                const btn = document.createElement('button');
                btn.textContent = fmtDay(d.day);
                if (d.day === data.selected) btn.classList.add('active');
                btn.onclick = async () => {
                    await fetch('/api/days/' + d.day + '/select', { method: 'POST' });
                    loadDays();
                };
                container.appendChild(btn);
            }
        }

        function render(view) {
            document.getElementById('status').textContent =
                view.day + ' · ' + view.state + ' · ' + view.revealed + '/' + view.total;

            chart.setOption({
                backgroundColor: '#ffffff',
                animation: false,
                title: [
                    { right: '1%', text: 'Price Chart', textStyle: { color: '#2384ff' } },
                    { top: '62%', right: '2%', text: 'RSI', textStyle: { color: '#2384ff' } },
                ],
                tooltip: { trigger: 'axis', axisPointer: { type: 'cross' } },
                legend: { data: ['Candlestick', 'RSI'] },
                dataZoom: [
                    { type: 'inside', xAxisIndex: [0, 1], start: 0, end: 100 },
                    { type: 'slider', xAxisIndex: [0, 1], start: 0, end: 100 },
                ],
                grid: [
                    { bottom: '50%', left: '5%', right: '5%' },
                    { top: '70%', left: '5%', right: '5%' },
                ],
                xAxis: [
                    { type: 'category', data: view.timestamps, gridIndex: 0 },
                    { type: 'category', data: view.timestamps, gridIndex: 1 },
                ],
                yAxis: [
                    { type: 'value', name: 'Price', gridIndex: 0, scale: true,
                      min: view.price_range.min, max: view.price_range.max },
                    { type: 'value', name: 'RSI', gridIndex: 1, min: 0, max: 100 },
                ],
                series: [
                    {
                        name: 'Candlestick',
                        type: 'candlestick',
                        data: view.candles,
                        xAxisIndex: 0,
                        yAxisIndex: 0,
                        itemStyle: { color: '#10b981', color0: '#ef4444',
                                     borderColor: '#10b981', borderColor0: '#ef4444' },
                        markPoint: {
                            data: view.markers.map(m => ({
                                name: m.kind,
                                coord: [m.time, m.price],
                                value: m.label,
                                symbol: 'pin',
                                symbolSize: 20,
                                label: { show: true, position: m.kind === 'StopLoss' ? 'bottom' : 'top',
                                         formatter: m.label },
                                itemStyle: { color: pinColor[m.kind] },
                            })),
                        },
                    },
                    {
                        name: 'RSI',
                        type: 'line',
                        data: view.rsi,
                        xAxisIndex: 1,
                        yAxisIndex: 1,
                        smooth: true,
                        showSymbol: false,
                        lineStyle: { width: 2, color: '#2384ff' },
                        areaStyle: { opacity: 0.2 },
                    },
                ],
            });

            const s = view.summary;
            document.getElementById('totals').textContent = s.total_trades === 0 ? '' :
                s.total_trades + ' trades · ' + s.winning_trades + ' won / ' + s.losing_trades +
                ' lost · win rate ' + s.win_rate.toFixed(1) + '% · total ' + s.total_points.toFixed(2) + ' pts';

            const body = document.getElementById('trades');
            body.innerHTML = '';
            for (const t of view.trades) {
                const tr = document.createElement('tr');
                const cells = [t.timestamp, t.entry_price, t.stop_loss ?? '-', t.exit_price,
                               t.trade_type, t.signal, t.points_captured.toFixed(2)];
                for (const value of cells) {
                    const td = document.createElement('td');
                    td.textContent = value;
                    tr.appendChild(td);
                }
                tr.lastChild.className = t.points_captured >= 0 ? 'pos' : 'neg';
                body.appendChild(tr);
            }
        }

        async function poll() {
            try {
                const res = await fetch('/api/view');
                if (res.ok) render(await res.json());
            } catch (e) {
                console.error(e);
            }
            setTimeout(poll, 500);
        }

        window.addEventListener('resize', () => chart.resize());
        window.onload = () => { loadDays(); poll(); };
    </script>
</body>
</html>"##;

#[cfg(test)]
mod tests {
    use super::INDEX_HTML;

    #[test]
    fn test_trade_rows_are_built_as_text() {
        assert!(INDEX_HTML.contains("td.textContent = value"));
        assert!(!INDEX_HTML.contains("tr.innerHTML"));
    }
}
